mod store;

pub use store::MongoDocumentStore;
