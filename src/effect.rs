#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadPage { offset: u32, limit: u32 },
    StoreSelection { id: String },
    /// Read the handoff slot and fetch the record; `id` tags the result.
    LoadDetail { id: String },
    LoadSprite { url: String },
}
