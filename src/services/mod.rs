/// Admin session control panel and status watching.
pub mod admin;
/// Results analytics for the admin view.
pub mod analytics;
/// Player-side live-play driver.
pub mod player;
/// Cancellable fixed-interval polling tasks.
pub mod poller;
