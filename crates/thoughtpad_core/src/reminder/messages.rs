//! Notification copy.

/// Titles for note reminders; one is picked at random per reminder.
pub const REMINDER_TITLES: &[&str] = &[
    "Stay on Track Today!",
    "Small Steps Count - Let's Get Started!",
    "Progress Awaits - Make Today Count!",
    "Just a Little Progress to Go!",
    "Let's Keep Momentum Going!",
    "Another Step Closer to Your Goal!",
    "Today's a Great Day for Progress!",
    "Focus Time! Let's Get it Done.",
    "Small Wins Lead to Big Results!",
    "Make Today's Goals Happen!",
    "Consistency is Key - Keep Pushing!",
    "It's Progress Time - Let's Move!",
    "Take Action Toward Your Goals!",
    "Success is Built on Daily Progress!",
    "One Step Closer Every Day!",
    "Your Goals Are Within Reach!",
    "Success Starts with a Single Step!",
    "Progress Over Perfection - Take Action!",
    "Focus Forward - Today is Yours!",
    "Your Future Self Will Thank You!",
];

/// (title, message) pairs for the periodic app-usage reminder.
const NUDGES: &[(&str, &str)] = &[
    (
        "You Got This!",
        "Don't forget, you're capable of amazing things. Keep pushing forward!",
    ),
    (
        "Small Wins Matter",
        "Celebrate your small victories today. They lead to big achievements!",
    ),
    (
        "Stay Focused",
        "A little progress each day adds up to big results. Stay on track!",
    ),
    (
        "Hydrate!",
        "Drink a glass of water now. Your body will thank you for it!",
    ),
    (
        "Stretch It Out",
        "Take a quick break to stretch. Your muscles need it!",
    ),
    (
        "Clear the Clutter",
        "Take 5 minutes to tidy up your workspace. A clear space = a clear mind.",
    ),
    (
        "Time to Prioritize",
        "Review your to-do list. What's the most important task right now?",
    ),
    (
        "Review Your Goals",
        "Are you on track with your goals? Take a moment to reassess.",
    ),
    (
        "Gratitude Moment",
        "Take a moment to think of one thing you're grateful for today.",
    ),
    (
        "Digital Detox",
        "Put down your phone for a bit. Enjoy a moment of screen-free time.",
    ),
    (
        "You Are Enough",
        "You are exactly where you need to be. Keep trusting the journey.",
    ),
];

pub fn random_reminder_title() -> &'static str {
    REMINDER_TITLES[rand::random_range(0..REMINDER_TITLES.len())]
}

/// Picks a random (title, message) pair for the periodic reminder.
pub fn periodic_nudge() -> (&'static str, &'static str) {
    NUDGES[rand::random_range(0..NUDGES.len())]
}
