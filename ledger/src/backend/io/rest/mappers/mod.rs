pub mod challan_mapper;
pub mod collection_mapper;
pub mod sibling_mapper;

pub use challan_mapper::ChallanMapper;
pub use collection_mapper::CollectionMapper;
pub use sibling_mapper::SiblingMapper;
