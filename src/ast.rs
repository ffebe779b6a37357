use std::rc::Rc;

use crate::interpreter::symbols::{ListId, MatrixId, ScalarId};

/// A binary operator of the expression language.
///
/// Operators are listed from the loosest to the tightest binding precedence
/// group: logical or, logical and, comparisons, additive, multiplicative and
/// power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `|` or `||`
    Or,
    /// `&` or `&&`
    And,
    /// `=` or `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
}

impl BinaryOperator {
    /// Returns the binding strength of the operator. Higher binds tighter.
    ///
    /// # Example
    /// ```
    /// use sqbra::ast::BinaryOperator;
    ///
    /// assert!(BinaryOperator::Mul.precedence() > BinaryOperator::Add.precedence());
    /// assert!(BinaryOperator::Pow.precedence() > BinaryOperator::Mul.precedence());
    /// ```
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Equal
            | Self::NotEqual
            | Self::Greater
            | Self::GreaterEqual
            | Self::Less
            | Self::LessEqual => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div | Self::Mod => 5,
            Self::Pow => 6,
        }
    }

    /// `a ^ b ^ c` groups as `a ^ (b ^ c)`; every other operator groups to the
    /// left.
    #[must_use]
    pub const fn is_right_associative(self) -> bool {
        matches!(self, Self::Pow)
    }

    /// Applies the operator to two already evaluated operands.
    ///
    /// Comparisons and logical operators yield `1.0` for true and `0.0` for
    /// false. A value is true when it is greater than zero.
    ///
    /// # Example
    /// ```
    /// use sqbra::ast::BinaryOperator;
    ///
    /// assert_eq!(BinaryOperator::Mod.apply(7.0, 4.0), 3.0);
    /// assert_eq!(BinaryOperator::LessEqual.apply(2.0, 2.0), 1.0);
    /// assert_eq!(BinaryOperator::And.apply(1.0, -1.0), 0.0);
    /// ```
    #[must_use]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Sub => left - right,
            Self::Mul => left * right,
            Self::Div => left / right,
            Self::Mod => left % right,
            Self::Pow => left.powf(right),
            Self::And => truth(is_truthy(left) && is_truthy(right)),
            Self::Or => truth(is_truthy(left) || is_truthy(right)),
            Self::Equal => truth((left - right).abs() == 0.0),
            Self::NotEqual => truth((left - right).abs() != 0.0),
            Self::Greater => truth(left > right),
            Self::GreaterEqual => truth(left >= right),
            Self::Less => truth(left < right),
            Self::LessEqual => truth(left <= right),
        }
    }

    /// The operator as written in source code.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Or => "|",
            Self::And => "&",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
        }
    }
}

/// Truthiness shared by conditions, loops and the logical operators.
#[must_use]
pub fn is_truthy(value: f64) -> bool {
    value > 0.0
}

const fn truth(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// A storage location named in source code.
///
/// References are bound to their symbol-table slot when the expression is
/// parsed. Subscripts stay expressions and are evaluated on every access, so
/// growing or shrinking a list never invalidates a parsed reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// A scalar variable such as `x`.
    Scalar(ScalarId),
    /// A list entry such as `values[i + 1]`.
    ListEntry {
        /// The list slot.
        list:  ListId,
        /// The subscript expression.
        index: Box<Expr>,
    },
    /// A matrix entry such as `grid[r][c]`.
    MatrixEntry {
        /// The matrix slot.
        matrix: MatrixId,
        /// The row subscript.
        row:    Box<Expr>,
        /// The column subscript.
        column: Box<Expr>,
    },
}

/// An arithmetic or boolean expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric constant, either written literally or folded by the
    /// optimizer.
    Constant(f64),
    /// A read of a scalar, list entry or matrix entry.
    Reference(Reference),
    /// A binary operation.
    BinaryOp {
        /// The operator.
        op:    BinaryOperator,
        /// Left operand.
        left:  Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },
}

impl Expr {
    /// Builds a binary node from two operands.
    #[must_use]
    pub fn binary(op: BinaryOperator, left: Self, right: Self) -> Self {
        Self::BinaryOp { op,
                         left: Box::new(left),
                         right: Box::new(right) }
    }

    /// Returns the value of a constant node.
    #[must_use]
    pub const fn as_constant(&self) -> Option<f64> {
        match self {
            Self::Constant(value) => Some(*value),
            _ => None,
        }
    }
}

/// The trigonometric builtins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrigFunction {
    /// `sin`
    Sin,
    /// `cos`
    Cos,
    /// `tan`
    Tan,
    /// `csc`, the reciprocal of `sin`
    Csc,
    /// `sec`, the reciprocal of `cos`
    Sec,
    /// `cot`, `cos / sin`
    Cot,
    /// `asin`
    Asin,
    /// `acos`
    Acos,
    /// `atan`
    Atan,
}

impl TrigFunction {
    /// Maps a keyword onto its trigonometric function.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "csc" => Self::Csc,
            "sec" => Self::Sec,
            "cot" => Self::Cot,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            _ => return None,
        })
    }

    /// The keyword that invokes the function.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Csc => "csc",
            Self::Sec => "sec",
            Self::Cot => "cot",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
        }
    }
}

/// In-place adjustments that take no operand besides their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// `ceil`
    Ceil,
    /// `floor`
    Floor,
    /// `abs`
    Abs,
}

/// A sequence of statements: the whole program or a block body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    /// The statements in source order.
    pub statements: Vec<Statement>,
}

/// A whole parsed program is its top-level block.
pub type Program = Block;

/// A single parsed statement together with its source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// What the statement does.
    pub kind: StatementKind,
    /// The 1-based source line.
    pub line: usize,
}

/// Every statement the language knows, one variant per keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `cvar <name> <expr>`
    DeclareScalar {
        /// The declared scalar.
        target: ScalarId,
        /// Its initial value.
        value:  Expr,
    },
    /// `clist <name> <length>`
    DeclareList {
        /// The declared list.
        list:   ListId,
        /// Number of zero-filled entries.
        length: Expr,
    },
    /// `cmat <name> <rows> <columns>`
    DeclareMatrix {
        /// The declared matrix.
        matrix:  MatrixId,
        /// Number of rows.
        rows:    Expr,
        /// Number of columns.
        columns: Expr,
    },
    /// `mvar <name>... <expr>`
    DeclareScalars {
        /// The declared scalars.
        targets: Vec<ScalarId>,
        /// The value every scalar starts with.
        value:   Expr,
    },
    /// `set <ref> <expr>`
    Assign {
        /// Where the value goes.
        target: Reference,
        /// The new value.
        value:  Expr,
    },
    /// `inc <ref>`
    Increment {
        /// The adjusted location.
        target: Reference,
    },
    /// `dec <ref>`
    Decrement {
        /// The adjusted location.
        target: Reference,
    },
    /// `ceil <ref>`, `floor <ref>`, `abs <ref>`
    Adjust {
        /// The adjusted location.
        target:     Reference,
        /// Which adjustment to apply.
        adjustment: Adjustment,
    },
    /// `round <ref> <precision>`
    Round {
        /// The rounded location.
        target:    Reference,
        /// The step the value is rounded to.
        precision: Expr,
    },
    /// `print ["text"]`
    PrintLine {
        /// The text between the string delimiters.
        text: String,
    },
    /// `printb ["text"]`
    PrintInline {
        /// The text between the string delimiters.
        text: String,
    },
    /// `printv <expr>`
    PrintValue {
        /// The printed expression.
        value: Expr,
    },
    /// `printm <matrix>`
    PrintMatrix {
        /// The printed matrix.
        matrix: MatrixId,
    },
    /// `input <ref> ["prompt"]`
    Input {
        /// Where the number read goes.
        target: Reference,
        /// Shown before reading.
        prompt: String,
    },
    /// `loop <ref> (do) [`
    Loop {
        /// The live counter, decremented after every iteration.
        counter: Reference,
        /// The loop body.
        body:    Block,
    },
    /// `sloop <expr> (do) [`
    SilentLoop {
        /// Evaluated once into a private counter.
        count: Expr,
        /// The loop body.
        body:  Block,
    },
    /// `autoloop <ref> <init> (do) [`
    InitLoop {
        /// The live counter.
        counter: Reference,
        /// Stored into the counter before the first iteration.
        initial: Expr,
        /// The loop body.
        body:    Block,
    },
    /// `while <expr> (do) [`
    While {
        /// Re-evaluated before every iteration.
        condition: Expr,
        /// The loop body.
        body:      Block,
    },
    /// `if <expr> (do) [`
    If {
        /// The branch condition.
        condition: Expr,
        /// Runs when the condition holds.
        body:      Block,
    },
    /// `elif <expr> (do) [`
    Elif {
        /// The branch condition.
        condition: Expr,
        /// Runs when the condition holds and no earlier branch ran.
        body:      Block,
    },
    /// `else (do) [`
    Else {
        /// Runs when no earlier branch ran.
        body: Block,
    },
    /// `sin <ref> <expr>` and the other trigonometric builtins.
    Trig {
        /// Which function.
        function: TrigFunction,
        /// Where the result goes.
        target:   Reference,
        /// The argument in radians.
        argument: Expr,
    },
    /// `log <ref> <value> <base>`
    Log {
        /// Where the result goes.
        target: Reference,
        /// The argument.
        value:  Expr,
        /// The logarithm base.
        base:   Expr,
    },
    /// `xroot <ref> <value> <degree>`
    Root {
        /// Where the result goes.
        target: Reference,
        /// The radicand.
        value:  Expr,
        /// The root degree.
        degree: Expr,
    },
    /// `random <ref> <max> <min>`
    Random {
        /// Where the result goes.
        target:  Reference,
        /// Upper bound, inclusive.
        maximum: Expr,
        /// Lower bound, inclusive.
        minimum: Expr,
    },
    /// `getl <ref> <list>`
    ListLength {
        /// Where the length goes.
        target: Reference,
        /// The measured list.
        list:   ListId,
    },
    /// `getdim <ref> <ref> <matrix>`
    MatrixDims {
        /// Where the row count goes.
        rows:    Reference,
        /// Where the column count goes.
        columns: Reference,
        /// The measured matrix.
        matrix:  MatrixId,
    },
    /// `push <expr> <list>`
    Push {
        /// The appended value.
        value: Expr,
        /// The list that grows.
        list:  ListId,
    },
    /// `pop <ref> <list>`
    Pop {
        /// Where the removed value goes.
        target: Reference,
        /// The list that shrinks.
        list:   ListId,
    },
    /// `chsl <list> <length>`
    Resize {
        /// The resized list.
        list:   ListId,
        /// The new length.
        length: Expr,
    },
    /// `ldef <list> [1,2,3]`
    DefineList {
        /// The declared list.
        list:   ListId,
        /// Its contents.
        values: Vec<f64>,
    },
    /// `mdef <matrix> [[1,2],[3,4]]`
    DefineMatrix {
        /// The declared matrix.
        matrix: MatrixId,
        /// Its rows.
        rows:   Vec<Vec<f64>>,
    },
    /// `readf <matrix> ["path"]`
    ReadTable {
        /// The matrix that receives the file contents.
        matrix: MatrixId,
        /// The table file.
        path:   String,
    },
    /// `writef <matrix> ["path"]`
    WriteTable {
        /// The matrix written out.
        matrix: MatrixId,
        /// The table file.
        path:   String,
    },
    /// `funct <name> [`
    DeclareFunction {
        /// The function name.
        name: String,
        /// The function body, shared with the function table once declared.
        body: Rc<Block>,
    },
    /// `call <name>`
    Call {
        /// The called function.
        name: String,
    },
    /// `sleep <milliseconds>`
    Sleep {
        /// How long to pause.
        millis: Expr,
    },
    /// `newl`
    NewLine,
    /// `exit`
    Exit,
    /// `leave`
    Leave,
}

impl StatementKind {
    /// Whether the statement continues an `if` chain.
    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::Elif { .. } | Self::Else { .. })
    }

    /// Whether an `elif` or `else` may directly follow this statement.
    #[must_use]
    pub const fn opens_chain(&self) -> bool {
        matches!(self, Self::If { .. } | Self::Elif { .. })
    }
}
