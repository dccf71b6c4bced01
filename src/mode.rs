/// Form field that receives keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Prompt,
    ImageSize,
    Steps,
    Seed,
    Guidance,
    NumImages,
    SyncMode,
    SafetyChecker,
}

static ORDER: [Field; 8] = [
    Field::Prompt,
    Field::ImageSize,
    Field::Steps,
    Field::Seed,
    Field::Guidance,
    Field::NumImages,
    Field::SyncMode,
    Field::SafetyChecker,
];

impl Field {
    fn index(&self) -> usize {
        ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        ORDER[(self.index() + 1) % ORDER.len()]
    }

    pub fn previous(&self) -> Self {
        ORDER[(self.index() + ORDER.len() - 1) % ORDER.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Prompt => "Prompt",
            Field::ImageSize => "Image Size",
            Field::Steps => "Inference Steps",
            Field::Seed => "Seed",
            Field::Guidance => "Guidance Scale",
            Field::NumImages => "Number of Images",
            Field::SyncMode => "Sync Mode",
            Field::SafetyChecker => "Enable Safety Checker",
        }
    }

    pub fn settings() -> &'static [Field] {
        &ORDER[1..]
    }
}
