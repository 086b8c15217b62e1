//! Google API plumbing shared by the Sheets, Firestore and FCM clients.

pub mod auth;

pub use auth::GoogleAuth;
