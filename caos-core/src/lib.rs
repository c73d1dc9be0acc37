pub use caos_entities as entities;

pub mod authorization;
pub mod db;
pub mod gateways;
pub mod repositories;
pub mod schema;
pub mod temporal;
pub mod usecases;

pub use self::repositories::Error as RepoError;
