//! The reference data that classifies transactions: statuses and the
//! transaction type > category > subcategory taxonomy.

mod category;
mod endpoints;
mod entry;
mod named;
mod page;
mod status;
mod subcategory;
mod transaction_type;

pub use category::{Category, CategoryListing, CategoryRepository, create_category_table};
pub use endpoints::{
    create_category_endpoint, create_status_endpoint, create_subcategory_endpoint,
    create_transaction_type_endpoint, delete_category_endpoint, delete_status_endpoint,
    delete_subcategory_endpoint, delete_transaction_type_endpoint, update_category_endpoint,
    update_status_endpoint, update_subcategory_endpoint, update_transaction_type_endpoint,
};
pub use entry::{EntryKind, EntryName};
pub use page::{DictionaryState, get_dictionaries_page};
pub use status::{Status, StatusRepository, create_status_table};
pub use subcategory::{
    Subcategory, SubcategoryListing, SubcategoryRepository, SubcategoryScope,
    create_subcategory_table,
};
pub use transaction_type::{TransactionType, TransactionTypeRepository, create_transaction_type_table};
