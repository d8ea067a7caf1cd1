pub mod config;
pub mod content;
pub mod forms;
pub mod locale;
pub mod logger;
pub mod mailer;
pub mod query_string;
pub mod seo;
pub mod server;
pub mod text_utils;
pub mod util;
pub mod view;
mod test_data;
