pub mod db;
pub mod game;
