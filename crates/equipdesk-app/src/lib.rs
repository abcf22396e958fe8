// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod confirm;
pub mod coordinator;
pub mod format;
pub mod forms;
pub mod ids;
pub mod list;
pub mod lookup;
pub mod model;
pub mod notice;
pub mod resource;
pub mod search;

pub use confirm::*;
pub use coordinator::*;
pub use forms::*;
pub use ids::*;
pub use list::*;
pub use model::*;
pub use notice::*;
pub use resource::*;
pub use search::*;
