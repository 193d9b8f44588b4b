mod loader;

pub use loader::{
    InssBracketRecord, InssTableLoader, IrrfBracketRecord, IrrfTableLoader, ParameterLoader,
    ParameterRecord, ReferenceDataLoaderError,
};
