/// Comparison operators.
///
/// These are the terms with a FIQL infix form and a direct document-store
/// counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Equal (`=`, `==`, `eq`)
    Eq,
    /// Not equal (`!=`, `ne`)
    Ne,
    /// Less than (`<`, `lt`)
    Lt,
    /// Less than or equal (`<=`, `le`)
    Le,
    /// Greater than (`>`, `gt`)
    Gt,
    /// Greater than or equal (`>=`, `ge`)
    Ge,
    /// Member of (`=in=`)
    In,
    /// Not a member of (`=nin=`)
    Nin,
    /// Contains all of (`=all=`)
    All,
}

impl CmpOp {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(CmpOp::Eq),
            "ne" => Some(CmpOp::Ne),
            "lt" => Some(CmpOp::Lt),
            "le" => Some(CmpOp::Le),
            "gt" => Some(CmpOp::Gt),
            "ge" => Some(CmpOp::Ge),
            "in" => Some(CmpOp::In),
            "nin" => Some(CmpOp::Nin),
            "all" => Some(CmpOp::All),
            _ => None,
        }
    }

    /// Maps a FIQL comparison symbol to its operator.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" | "==" => Some(CmpOp::Eq),
            "!=" => Some(CmpOp::Ne),
            "<" => Some(CmpOp::Lt),
            "<=" => Some(CmpOp::Le),
            ">" => Some(CmpOp::Gt),
            ">=" => Some(CmpOp::Ge),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CmpOp::Eq => "eq",
            CmpOp::Ne => "ne",
            CmpOp::Lt => "lt",
            CmpOp::Le => "le",
            CmpOp::Gt => "gt",
            CmpOp::Ge => "ge",
            CmpOp::In => "in",
            CmpOp::Nin => "nin",
            CmpOp::All => "all",
        }
    }

    /// Infix form used by the string serializer.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            CmpOp::Eq => Some("="),
            CmpOp::Ne => Some("!="),
            CmpOp::Lt => Some("<"),
            CmpOp::Le => Some("<="),
            CmpOp::Gt => Some(">"),
            CmpOp::Ge => Some(">="),
            CmpOp::In => Some("=in="),
            CmpOp::Nin => Some("=nin="),
            CmpOp::All => None,
        }
    }

    /// Document-store operator key. `eq` has none: it compiles to a bare value.
    pub fn mongo_key(self) -> Option<&'static str> {
        match self {
            CmpOp::Eq => None,
            CmpOp::Ne => Some("$ne"),
            CmpOp::Lt => Some("$lt"),
            CmpOp::Le => Some("$lte"),
            CmpOp::Gt => Some("$gt"),
            CmpOp::Ge => Some("$gte"),
            CmpOp::In => Some("$in"),
            CmpOp::Nin => Some("$nin"),
            CmpOp::All => Some("$all"),
        }
    }

    /// Operators whose operand must be a non-empty array.
    pub fn takes_array(self) -> bool {
        matches!(self, CmpOp::In | CmpOp::Nin | CmpOp::All)
    }
}
