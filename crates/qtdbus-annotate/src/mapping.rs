//! D-Bus wire signature to Qt type name table.

/// Annotation read by `qdbusxml2cpp` to pick the C++ type of a property.
///
/// Arguments use the same name with an `.In<N>` / `.Out<N>` suffix.
pub const QT_TYPE_NAME: &str = "org.qtproject.QtDBus.QtTypeName";

/// Dictionary of string to variant (`a{sv}`).
pub const VARIANT_MAP: &str = "a{sv}";
/// Array of dictionaries (`aa{sv}`).
pub const VARIANT_MAP_LIST: &str = "aa{sv}";
/// MPRIS playlist struct: object path, name, icon (`(oss)`).
pub const PLAYLIST: &str = "(oss)";
/// Array of playlists (`a(oss)`).
pub const PLAYLIST_LIST: &str = "a(oss)";
/// Validity flag plus playlist (`(b(oss))`).
pub const MAYBE_PLAYLIST: &str = "(b(oss))";

const MPRIS_TYPES: &[(&str, &str)] = &[
    (VARIANT_MAP, "QVariantMap"),
    (VARIANT_MAP_LIST, "QVector<QVariantList>"),
    (PLAYLIST, "MprisPlaylist"),
    (PLAYLIST_LIST, "MprisPlaylistList"),
    (MAYBE_PLAYLIST, "MprisMaybePlaylist"),
];

/// Immutable lookup from wire signature to Qt type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    entries: &'static [(&'static str, &'static str)],
}

impl TypeMapping {
    /// Mapping over a caller-provided table of `(wire, qt)` pairs.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// The table used for the MPRIS interfaces.
    pub const fn mpris() -> Self {
        Self::new(MPRIS_TYPES)
    }

    /// Qt type for a wire signature, if the signature is mapped.
    ///
    /// Signatures are compared verbatim; `a{sv}` and `a{ sv }` are different
    /// keys.
    pub fn qt_type(&self, wire: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == wire)
            .map(|(_, qt)| *qt)
    }

    pub fn contains(&self, wire: &str) -> bool {
        self.qt_type(wire).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self::mpris()
    }
}
