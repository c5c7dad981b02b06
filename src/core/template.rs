// LogTriage - core/template.rs
//
// `$Name` placeholder resolution for rule fields.
//
// Placeholders are plain textual tokens replaced verbatim. The six
// identifier placeholders are replaced first, in slot order, then
// `$Version` (only when a non-empty version is supplied). Replacing the
// longer `$VersionIdentifier*` tokens before `$Version` is what keeps
// them from being clobbered by the shorter token.

/// Token resolved to the version extracted from the log.
pub const VERSION_PLACEHOLDER: &str = "$Version";

/// The six well-known identifier fields, in the fixed order they are
/// rewritten during a substitution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierSlot {
    VersionStart,
    VersionEnd,
    Restart,
    Exception,
    Exit,
    Crash,
}

impl IdentifierSlot {
    /// All slots in substitution order.
    pub const ALL: [IdentifierSlot; 6] = [
        IdentifierSlot::VersionStart,
        IdentifierSlot::VersionEnd,
        IdentifierSlot::Restart,
        IdentifierSlot::Exception,
        IdentifierSlot::Exit,
        IdentifierSlot::Crash,
    ];

    /// Rules-document field name; the placeholder is this name prefixed by `$`.
    pub fn field_name(self) -> &'static str {
        match self {
            IdentifierSlot::VersionStart => "VersionIdentifierStart",
            IdentifierSlot::VersionEnd => "VersionIdentifierEnd",
            IdentifierSlot::Restart => "RestartIdentifier",
            IdentifierSlot::Exception => "ExceptionIdentifier",
            IdentifierSlot::Exit => "ExitIdentifier",
            IdentifierSlot::Crash => "CrashIdentifier",
        }
    }

    /// Placeholder token referring to this slot.
    pub fn placeholder(self) -> &'static str {
        match self {
            IdentifierSlot::VersionStart => "$VersionIdentifierStart",
            IdentifierSlot::VersionEnd => "$VersionIdentifierEnd",
            IdentifierSlot::Restart => "$RestartIdentifier",
            IdentifierSlot::Exception => "$ExceptionIdentifier",
            IdentifierSlot::Exit => "$ExitIdentifier",
            IdentifierSlot::Crash => "$CrashIdentifier",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Current raw values of the six identifier fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierValues {
    values: [String; 6],
}

impl IdentifierValues {
    pub fn get(&self, slot: IdentifierSlot) -> &str {
        &self.values[slot.index()]
    }

    pub fn set(&mut self, slot: IdentifierSlot, value: String) {
        self.values[slot.index()] = value;
    }

    /// Replace every placeholder in `input` using the values as they stand now.
    ///
    /// `$Version` is left untouched when `version` is `None` or empty.
    pub fn resolve(&self, input: &str, version: Option<&str>) -> String {
        let mut out = input.to_string();
        for slot in IdentifierSlot::ALL {
            if out.contains(slot.placeholder()) {
                out = out.replace(slot.placeholder(), self.get(slot));
            }
        }
        match version {
            Some(v) if !v.is_empty() => out.replace(VERSION_PLACEHOLDER, v),
            _ => out,
        }
    }

    /// Rewrite each slot in place, in slot order. A slot sees the values of
    /// the slots before it as already rewritten during this call.
    pub fn resolve_in_order(&mut self, version: Option<&str>) {
        for slot in IdentifierSlot::ALL {
            let next = self.resolve(self.get(slot), version);
            self.set(slot, next);
        }
    }
}
