pub mod image_host;
pub mod mailer;
