mod common;

use common::{note, Fixture};
use thoughtpad_core::{
    CryptoError, InMemoryKeyProvider, NoteService, NoteServiceContext, NoteServiceError,
    PasswordCipher, SqliteNoteRepository,
};

#[test]
fn locked_note_stores_envelope_and_verifies_password() {
    let fx = Fixture::new();
    let service = fx.service();
    let saved = service.insert_note_with_details(note("bank"), &[], &[]).unwrap();

    let locked = service.lock_note(saved.note.id, "  s3cret ").unwrap();

    let envelope = locked.password.clone().unwrap();
    assert!(!envelope.windows(6).any(|window| window == b"s3cret"));
    assert_eq!(service.decrypt_password(&envelope).unwrap(), "s3cret");
    assert!(service.unlock_note(saved.note.id, "s3cret").unwrap());
    assert!(service.unlock_note(saved.note.id, " s3cret\n").unwrap());
    assert!(!service.unlock_note(saved.note.id, "wrong").unwrap());

    let stored = service.get_note_details(saved.note.id).unwrap().unwrap();
    assert_eq!(stored.note.password, Some(envelope));
}

#[test]
fn note_without_password_always_unlocks() {
    let fx = Fixture::new();
    let service = fx.service();
    let saved = service.insert_note_with_details(note("open"), &[], &[]).unwrap();
    assert!(service.unlock_note(saved.note.id, "anything").unwrap());
}

#[test]
fn remove_password_clears_lock() {
    let fx = Fixture::new();
    let service = fx.service();
    let saved = service.insert_note_with_details(note("diary"), &[], &[]).unwrap();
    service.lock_note(saved.note.id, "pw").unwrap();

    let cleared = service.remove_password(saved.note.id).unwrap();

    assert!(!cleared.is_locked());
    let stored = service.get_note_details(saved.note.id).unwrap().unwrap();
    assert_eq!(stored.note.password, None);
}

#[test]
fn blank_password_is_rejected() {
    let fx = Fixture::new();
    let service = fx.service();
    let saved = service.insert_note_with_details(note("x"), &[], &[]).unwrap();

    assert!(matches!(
        service.lock_note(saved.note.id, "   "),
        Err(NoteServiceError::BlankPassword)
    ));
    assert!(matches!(
        service.lock_note(uuid_of_missing_note(), "pw"),
        Err(NoteServiceError::NoteNotFound(_))
    ));
}

#[test]
fn envelope_from_another_key_does_not_decrypt() {
    let fx = Fixture::new();
    let service = fx.service();
    let foreign = PasswordCipher::from_provider(&InMemoryKeyProvider::new()).unwrap();
    let envelope = foreign.encrypt(b"pw").unwrap();

    assert!(matches!(
        service.decrypt_password(&envelope),
        Err(NoteServiceError::Crypto(CryptoError::Decrypt))
    ));
}

#[test]
fn password_operations_need_a_cipher() {
    let fx = Fixture::new();
    let service = NoteService::new(
        SqliteNoteRepository::try_new(&fx.conn).unwrap(),
        NoteServiceContext {
            prefs: &fx.prefs,
            reminders: &fx.reminders,
            cipher: None,
        },
    );
    let saved = service.insert_note_with_details(note("plain"), &[], &[]).unwrap();

    assert!(matches!(
        service.lock_note(saved.note.id, "pw"),
        Err(NoteServiceError::CipherUnavailable)
    ));
    assert!(service.unlock_note(saved.note.id, "pw").unwrap());
}

fn uuid_of_missing_note() -> thoughtpad_core::NoteId {
    thoughtpad_core::Note::new().id
}
