use std::collections::HashMap;

use crate::{error::ParseError, interpreter::parser::core::ParseResult};

/// Names of the built-in constants and their values.
///
/// They are declared as ordinary scalars before any user code is parsed, so
/// redeclaring one is a name error like any other duplicate.
pub const CONSTANTS: [(&str, f64); 7] = [("cpi", std::f64::consts::PI),
                                         ("ce", std::f64::consts::E),
                                         ("csqr2", std::f64::consts::SQRT_2),
                                         ("csqr3", 1.732_050_807_568_877_2),
                                         ("cemas", 0.577_215_664_901_532_9),
                                         ("cproa", 1.618_033_988_749_895),
                                         ("capry", 1.202_056_903_159_594_3)];

/// Name of the list that receives command-line numbers.
pub const ARGUMENTS_LIST: &str = "args";

/// The four independent namespaces of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Scalar variables.
    Scalar,
    /// One-dimensional lists.
    List,
    /// Two-dimensional matrices.
    Matrix,
    /// Parameterless functions.
    Function,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Scalar => "Variable",
            Self::List => "List",
            Self::Matrix => "Matrix",
            Self::Function => "Function",
        };
        f.write_str(name)
    }
}

/// Stable handle to a scalar slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarId(usize);

/// Stable handle to a list slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(usize);

/// Stable handle to a matrix slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixId(usize);

/// A name-to-slot table.
///
/// Slots are only ever appended, so a slot index handed out once stays valid
/// for the lifetime of the table.
#[derive(Debug, Clone)]
pub struct SymbolTable<T> {
    names: Vec<String>,
    slots: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self { names: Vec::new(),
               slots: Vec::new(),
               index: HashMap::new(), }
    }
}

impl<T> SymbolTable<T> {
    /// Adds a new name with its initial value.
    ///
    /// Returns `None` when the name is already taken.
    pub fn declare(&mut self, name: &str, value: T) -> Option<usize> {
        if self.index.contains_key(name) {
            return None;
        }
        let slot = self.slots.len();
        self.names.push(name.to_string());
        self.slots.push(value);
        self.index.insert(name.to_string(), slot);
        Some(slot)
    }

    /// Finds the slot of a declared name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Number of declared names.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing has been declared yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn name(&self, slot: usize) -> &str {
        &self.names[slot]
    }

    fn get(&self, slot: usize) -> &T {
        &self.slots[slot]
    }

    fn get_mut(&mut self, slot: usize) -> &mut T {
        &mut self.slots[slot]
    }
}

/// Storage for every scalar, list and matrix of a program.
///
/// The parser declares names and resolves them to handles. The evaluator
/// reads and writes through those handles.
#[derive(Debug, Clone)]
pub struct Symbols {
    scalars:  SymbolTable<f64>,
    lists:    SymbolTable<Vec<f64>>,
    matrices: SymbolTable<Vec<Vec<f64>>>,
}

impl Default for Symbols {
    fn default() -> Self {
        Self::new()
    }
}

impl Symbols {
    /// Creates the symbol tables with the built-in constants already
    /// declared.
    ///
    /// # Example
    /// ```
    /// use sqbra::interpreter::symbols::Symbols;
    ///
    /// let symbols = Symbols::new();
    /// assert_eq!(symbols.scalar_value("cpi"), Some(std::f64::consts::PI));
    /// assert_eq!(symbols.scalar_value("x"), None);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let mut scalars = SymbolTable::default();
        for (name, value) in CONSTANTS {
            scalars.declare(name, value);
        }
        Self { scalars,
               lists: SymbolTable::default(),
               matrices: SymbolTable::default() }
    }

    /// Declares a scalar initialised to zero.
    pub fn declare_scalar(&mut self, name: &str, line: usize) -> ParseResult<ScalarId> {
        self.scalars
            .declare(name, 0.0)
            .map(ScalarId)
            .ok_or_else(|| already_defined(SymbolKind::Scalar, name, line))
    }

    /// Declares an empty list.
    pub fn declare_list(&mut self, name: &str, line: usize) -> ParseResult<ListId> {
        self.lists
            .declare(name, Vec::new())
            .map(ListId)
            .ok_or_else(|| already_defined(SymbolKind::List, name, line))
    }

    /// Declares an empty matrix.
    pub fn declare_matrix(&mut self, name: &str, line: usize) -> ParseResult<MatrixId> {
        self.matrices
            .declare(name, Vec::new())
            .map(MatrixId)
            .ok_or_else(|| already_defined(SymbolKind::Matrix, name, line))
    }

    /// Resolves a scalar name to its handle.
    pub fn resolve_scalar(&self, name: &str, line: usize) -> ParseResult<ScalarId> {
        self.scalars
            .lookup(name)
            .map(ScalarId)
            .ok_or_else(|| undefined(SymbolKind::Scalar, name, line))
    }

    /// Resolves a list name to its handle.
    pub fn resolve_list(&self, name: &str, line: usize) -> ParseResult<ListId> {
        self.lists
            .lookup(name)
            .map(ListId)
            .ok_or_else(|| undefined(SymbolKind::List, name, line))
    }

    /// Resolves a matrix name to its handle.
    pub fn resolve_matrix(&self, name: &str, line: usize) -> ParseResult<MatrixId> {
        self.matrices
            .lookup(name)
            .map(MatrixId)
            .ok_or_else(|| undefined(SymbolKind::Matrix, name, line))
    }

    /// Current value of a scalar.
    #[must_use]
    pub fn scalar(&self, id: ScalarId) -> f64 {
        *self.scalars.get(id.0)
    }

    /// Overwrites the value of a scalar.
    pub fn set_scalar(&mut self, id: ScalarId, value: f64) {
        *self.scalars.get_mut(id.0) = value;
    }

    /// Entries of a list.
    #[must_use]
    pub fn list(&self, id: ListId) -> &Vec<f64> {
        self.lists.get(id.0)
    }

    /// Mutable entries of a list, for `push`, `pop` and resizing.
    pub fn list_mut(&mut self, id: ListId) -> &mut Vec<f64> {
        self.lists.get_mut(id.0)
    }

    /// Rows of a matrix.
    #[must_use]
    pub fn matrix(&self, id: MatrixId) -> &Vec<Vec<f64>> {
        self.matrices.get(id.0)
    }

    /// Mutable rows of a matrix.
    pub fn matrix_mut(&mut self, id: MatrixId) -> &mut Vec<Vec<f64>> {
        self.matrices.get_mut(id.0)
    }

    /// The declared name of a list, used in error messages.
    #[must_use]
    pub fn list_name(&self, id: ListId) -> &str {
        self.lists.name(id.0)
    }

    /// The declared name of a matrix, used in error messages.
    #[must_use]
    pub fn matrix_name(&self, id: MatrixId) -> &str {
        self.matrices.name(id.0)
    }

    /// Looks up the current value of a scalar by name.
    #[must_use]
    pub fn scalar_value(&self, name: &str) -> Option<f64> {
        self.scalars.lookup(name).map(|slot| *self.scalars.get(slot))
    }

    /// Looks up the current contents of a list by name.
    #[must_use]
    pub fn list_values(&self, name: &str) -> Option<&[f64]> {
        self.lists.lookup(name).map(|slot| self.lists.get(slot).as_slice())
    }

    /// Looks up the current contents of a matrix by name.
    #[must_use]
    pub fn matrix_values(&self, name: &str) -> Option<&[Vec<f64>]> {
        self.matrices
            .lookup(name)
            .map(|slot| self.matrices.get(slot).as_slice())
    }
}

fn already_defined(kind: SymbolKind, name: &str, line: usize) -> ParseError {
    ParseError::AlreadyDefined { kind,
                                 name: name.to_string(),
                                 line }
}

fn undefined(kind: SymbolKind, name: &str, line: usize) -> ParseError {
    ParseError::Undefined { kind,
                            name: name.to_string(),
                            line }
}
