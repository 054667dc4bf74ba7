pub mod cities;
pub mod forecasts;
pub mod health;
