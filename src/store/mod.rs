mod store;

pub use store::IndexStore;
