pub mod model;
pub mod mongo;
pub mod repo;

pub use model::*;
pub use mongo::MongoRepository;
pub use repo::*;
