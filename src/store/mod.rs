pub mod storage;
pub mod types;

pub use storage::{
    get_store_path, load_store_state, save_store_state, AssessmentStore, JsonFileStore,
    MemoryStore,
};
pub use types::{
    new_assessment_id, user_from_assessment_id, AssessmentRecord, StoreState, STORE_VERSION,
};
