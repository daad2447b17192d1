mod store;

pub(crate) use store::load_json_file;
pub use store::JsonStore;
