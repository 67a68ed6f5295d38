use serde::Serialize;
use utoipa::ToSchema;

/// Logical sheet selected by the `tipo` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SheetType {
    Logistica,
    Contactos,
    Usuarios,
}

impl SheetType {
    pub const ALL: [SheetType; 3] = [Self::Logistica, Self::Contactos, Self::Usuarios];

    /// Wire name, as accepted in `tipo`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logistica => "logistica",
            Self::Contactos => "contactos",
            Self::Usuarios => "usuarios",
        }
    }

    /// Exact, case-sensitive lookup by wire name.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Tab name inside the spreadsheet.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::Logistica => "Datos",
            Self::Contactos => "Contactos",
            Self::Usuarios => "Usuarios",
        }
    }

    /// Cells returned by a read. Header rows above the range are skipped.
    fn read_cells(self) -> &'static str {
        match self {
            Self::Usuarios => "A2:F100",
            Self::Logistica | Self::Contactos => "A7:O1000",
        }
    }

    /// First cell of the table that appends are anchored to.
    fn anchor_cell(self) -> &'static str {
        match self {
            Self::Usuarios => "A2",
            Self::Logistica | Self::Contactos => "A7",
        }
    }

    /// A1 range used for reads, e.g. `Datos!A7:O1000`.
    pub fn read_range(self) -> String {
        format!("{}!{}", self.sheet_name(), self.read_cells())
    }

    /// A1 range used for appends, e.g. `Contactos!A7`.
    pub fn append_range(self) -> String {
        format!("{}!{}", self.sheet_name(), self.anchor_cell())
    }
}

impl std::fmt::Display for SheetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation selected by the `action` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            _ => None,
        }
    }
}

/// How the spreadsheet interprets appended values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Stored literally.
    Raw,
    /// Parsed as if typed into the UI (dates, numbers, formulas).
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "RAW" => Some(Self::Raw),
            "USER_ENTERED" => Some(Self::UserEntered),
            _ => None,
        }
    }
}
