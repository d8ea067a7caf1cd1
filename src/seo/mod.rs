pub mod sitemap;
pub mod structured_data;
