/// Options shared by the decoder and the encoder.
///
/// The defaults reproduce the compiler's own behaviour: interning is deduplicated and
/// unrecognised parts or subobject types are dropped with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RdatSettings {
    deduplicate: bool,
    strict: bool,
}

impl Default for RdatSettings {
    fn default() -> Self {
        RdatSettings {
            deduplicate: true,
            strict: false,
        }
    }
}

impl RdatSettings {
    pub fn new() -> Self {
        RdatSettings::default()
    }

    /// Whether strings and index arrays are deduplicated while encoding.
    ///
    /// Turning this off still produces a valid chunk, but not the byte layout the compiler
    /// would have written.
    pub fn deduplicate(self, deduplicate: bool) -> Self {
        RdatSettings {
            deduplicate,
            ..self
        }
    }

    /// Whether unknown parts and subobject types are errors instead of warnings.
    pub fn strict(self, strict: bool) -> Self {
        RdatSettings { strict, ..self }
    }

    pub fn should_deduplicate(&self) -> bool {
        self.deduplicate
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}
