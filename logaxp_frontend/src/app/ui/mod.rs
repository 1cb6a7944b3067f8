pub mod admin;
pub mod authors;
pub mod body;
pub mod create;
pub mod dialogs;
pub mod home;
pub mod images;
pub mod post;
pub mod sign_in;
