use std::{
    cell::RefCell,
    fs,
    io::{self, Cursor, Write},
    rc::Rc,
};

use sqbra::{
    ast::{Expr, StatementKind},
    error::{Error, ErrorKind},
    interpreter::evaluator::core::Context,
    parse_program, run_with_context,
};
use walkdir::WalkDir;

/// An output sink the test can read back after the context took ownership.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn execute(source: &str, input: &str) -> (Result<(), Error>, String, Context) {
    let buffer = SharedBuffer::default();
    let mut context = Context::with_io(Cursor::new(input.to_string()), buffer.clone());
    let result = run_with_context(source, &mut context);
    let output = String::from_utf8(buffer.0.borrow().clone()).unwrap();
    (result, output, context)
}

fn output_of(source: &str) -> String {
    let (result, output, _) = execute(source, "");
    if let Err(e) = result {
        panic!("Script failed: {e}\n{source}");
    }
    output
}

fn context_of(source: &str) -> Context {
    let (result, _, context) = execute(source, "");
    if let Err(e) = result {
        panic!("Script failed: {e}\n{source}");
    }
    context
}

fn error_of(source: &str) -> Error {
    match execute(source, "").0 {
        Ok(()) => panic!("Script succeeded but was expected to fail:\n{source}"),
        Err(e) => e,
    }
}

#[test]
fn demo_scripts_run() {
    let mut count = 0;

    for entry in
        WalkDir::new("demos").into_iter()
                             .filter_map(Result::ok)
                             .filter(|e| e.path().extension().is_some_and(|ext| ext == "sqbr"))
    {
        let path = entry.path();
        let source =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        count += 1;
        if let (Err(e), output, _) = execute(&source, "") {
            panic!("Demo {path:?} failed: {e}\nOutput so far:\n{output}");
        }
    }

    assert!(count > 0, "No demo scripts found in demos/");
}

#[test]
fn demo_output_is_stable() {
    let source = fs::read_to_string("demos/functions.sqbr").unwrap();
    assert_eq!(output_of(&source), "3\n2\n1\nFirst even value: 8\n");

    let source = fs::read_to_string("demos/matrix.sqbr").unwrap();
    let output = output_of(&source);
    assert!(output.starts_with("[1, 2, 3, 4, 5]\n[2, 4, 6, 8, 10]\n"));
    assert!(output.ends_with("Sum of small: 10\n"));
}

#[test]
fn operator_precedence() {
    assert_eq!(output_of("printv 2+3*4"), "14");
    assert_eq!(output_of("printv (2+3)*4"), "20");
    assert_eq!(output_of("printv 2^3^2"), "512");
    assert_eq!(output_of("printv 10-4-3"), "3");
    assert_eq!(output_of("printv 7%4"), "3");
}

#[test]
fn comparisons_yield_one_or_zero() {
    assert_eq!(output_of("printv 3>2\nnewl\nprintv 3<2"), "1\n0");
    assert_eq!(output_of("printv (1<2)&(2<3)\nnewl\nprintv (1>2)||(2>3)"), "1\n0");
    assert_eq!(output_of("printv 2==2\nnewl\nprintv 2!=2"), "1\n0");
}

#[test]
fn constant_subtrees_are_folded() {
    let mut context = Context::with_io(Cursor::new(""), Vec::new());
    let program = parse_program("cvar x 2*3+1\ncvar y x*1+0", &mut context).unwrap();
    assert!(matches!(program.statements[0].kind,
                     StatementKind::DeclareScalar { value: Expr::Constant(7.0), .. }));
    assert!(matches!(program.statements[1].kind,
                     StatementKind::DeclareScalar { value: Expr::Reference(_), .. }));
}

#[test]
fn use_before_declaration_is_a_name_error() {
    let err = error_of("set y 1");
    assert_eq!(err.kind(), ErrorKind::Name);
    assert_eq!(err.kind().exit_code(), 5);

    let err = error_of("cvar x 1\ncvar x 2");
    assert_eq!(err.kind(), ErrorKind::Name);
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn counted_loop_runs_exactly_n_times() {
    let context = context_of("cvar x 5\ncvar n 0\nloop x do [\ninc n\n]");
    assert_eq!(context.symbols.scalar_value("n"), Some(5.0));
    assert_eq!(context.symbols.scalar_value("x"), Some(0.0));

    let context = context_of("cvar x 0\ncvar n 0\nloop x [\ninc n\n]");
    assert_eq!(context.symbols.scalar_value("n"), Some(0.0));
}

#[test]
fn silent_loop_reads_its_count_once() {
    let context = context_of("cvar x 3\ncvar n 0\nsloop x [\ninc x\ninc n\n]");
    assert_eq!(context.symbols.scalar_value("n"), Some(3.0));
    assert_eq!(context.symbols.scalar_value("x"), Some(6.0));
}

#[test]
fn init_loop_sets_its_counter_first() {
    let output = output_of("cvar i 99\nautoloop i 3 [\nprintv i\n]");
    assert_eq!(output, "321");
}

#[test]
fn while_loop_reevaluates_its_condition() {
    let context = context_of("cvar x 1\nwhile (x < 100) [\nset x x*2\n]");
    assert_eq!(context.symbols.scalar_value("x"), Some(128.0));
}

#[test]
fn if_chain_takes_exactly_one_branch() {
    let chain = "if (x > 1) [\nprint [\"A\"]\n]\nelif (x > 0) [\nprint [\"B\"]\n]\nelse [\nprint [\"C\"]\n]";
    assert_eq!(output_of(&format!("cvar x 2\n{chain}")), "A\n");
    assert_eq!(output_of(&format!("cvar x 1\n{chain}")), "B\n");
    assert_eq!(output_of(&format!("cvar x 0\n{chain}")), "C\n");
}

#[test]
fn chains_are_separated_by_other_statements() {
    let source = "cvar x 0\nif x [\n]\nelse [\nprint [\"first\"]\n]\nif 1 [\nprint [\"second\"]\n]\nelse [\nprint [\"never\"]\n]";
    assert_eq!(output_of(source), "first\nsecond\n");
}

#[test]
fn nested_chains_do_not_leak() {
    let source = "\
cvar x 1
if x [
    if 0 [
        print [\"inner if\"]
    ]
    else [
        print [\"inner else\"]
    ]
]
else [
    print [\"outer else\"]
]";
    assert_eq!(output_of(source), "inner else\n");
}

#[test]
fn dangling_else_is_a_syntax_error() {
    let err = error_of("cvar x 1\nelse [\n]");
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn out_of_bounds_write_has_no_side_effect() {
    let (result, _, context) = execute("clist xs 3\ncvar i 0\nset xs[i+5] 9", "");
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Index);
    assert_eq!(context.symbols.list_values("xs"), Some(&[0.0, 0.0, 0.0][..]));

    let (result, _, context) = execute("mdef m [[1,2],[3,4]]
set m[1][2] 9", "");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Index);
    assert_eq!(context.symbols.matrix_values("m"),
               Some(&[vec![1.0, 2.0], vec![3.0, 4.0]][..]));
}

#[test]
fn negative_and_fractional_subscripts() {
    assert_eq!(error_of("clist xs 2\nprintv xs[-1]").kind(), ErrorKind::Index);
    assert_eq!(output_of("ldef xs [4, 5]\nprintv xs[1.8]"), "5");
}

#[test]
fn leave_exits_the_nearest_loop() {
    let source = "\
cvar outer 3
cvar count 0
loop outer [
    sloop 10 [
        inc count
        leave
    ]
]";
    let context = context_of(source);
    assert_eq!(context.symbols.scalar_value("count"), Some(3.0));
}

#[test]
fn leave_returns_from_a_function() {
    let output = output_of("funct f [\nprint [\"a\"]\nleave\nprint [\"b\"]\n]\ncall f\nprint [\"c\"]");
    assert_eq!(output, "a\nc\n");
}

#[test]
fn exit_stops_everything() {
    let source = "funct f [\nwhile 1 [\nexit\n]\n]\ncall f\nprint [\"unreachable\"]";
    let (result, output, _) = execute(source, "");
    assert!(result.is_ok());
    assert!(output.is_empty());
}

#[test]
fn calling_an_undeclared_function_fails() {
    let err = error_of("call g\nfunct g [\n]");
    assert_eq!(err.kind(), ErrorKind::Name);
}

#[test]
fn functions_see_globals() {
    let context = context_of("cvar x 1\nfunct double [\nset x x*2\n]\ncall double\ncall double");
    assert_eq!(context.symbols.scalar_value("x"), Some(4.0));
}

#[test]
fn list_operations() {
    let source = "\
clist xs 2
push 7 xs
cvar n 0
getl n xs
cvar top 0
pop top xs
chsl xs 4
";
    let context = context_of(source);
    assert_eq!(context.symbols.scalar_value("n"), Some(3.0));
    assert_eq!(context.symbols.scalar_value("top"), Some(7.0));
    assert_eq!(context.symbols.list_values("xs"), Some(&[0.0, 0.0, 0.0, 0.0][..]));
}

#[test]
fn popping_an_empty_list_is_an_index_error() {
    assert_eq!(error_of("clist xs 0\ncvar x 0\npop x xs").kind(), ErrorKind::Index);
}

#[test]
fn pop_into_the_same_list() {
    let context = context_of("ldef xs [1,2,3]\npop xs[0] xs");
    assert_eq!(context.symbols.list_values("xs"), Some(&[3.0, 2.0][..]));

    let (result, _, context) = execute("ldef xs [1,2,3]\npop xs[2] xs", "");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Index);
    assert_eq!(context.symbols.list_values("xs"), Some(&[1.0, 2.0, 3.0][..]));
}

#[test]
fn impossible_sizes_are_domain_errors() {
    assert_eq!(error_of("clist xs 1e15").kind(), ErrorKind::Domain);
    assert_eq!(error_of("cmat m 1e8 1e8").kind(), ErrorKind::Domain);
    assert_eq!(error_of("clist xs 2\nchsl xs 1e15").kind(), ErrorKind::Domain);
    assert_eq!(error_of("clist xs -1").kind(), ErrorKind::Domain);
}

#[test]
fn matrix_dimensions_and_printing() {
    let source = "mdef m [[1,2,3],[4,5,6]]\nmvar r c 0\ngetdim r c m\nprintv r*10+c\nnewl\nprintm m";
    assert_eq!(output_of(source), "23\n[1, 2, 3]\n[4, 5, 6]\n");
}

#[test]
fn table_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Table.csv");
    let path = path.to_str().unwrap();
    let source = format!("mdef a [[0.1, 2], [3.25, -4]]\ncmat b 0 0\nwritef a [\"{path}\"]\nreadf b [\"{path}\"]");
    let context = context_of(&source);
    assert_eq!(context.symbols.matrix_values("b"),
               context.symbols.matrix_values("a"));
    assert!(fs::read_to_string(path).unwrap().ends_with(" \n"));
}

#[test]
fn malformed_table_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "1,2\nthree,4\n").unwrap();
    let source = format!("cmat m 0 0\nreadf m [\"{}\"]", path.to_str().unwrap());
    assert_eq!(error_of(&source).kind(), ErrorKind::Format);
}

#[test]
fn missing_table_is_an_io_error() {
    let err = error_of("cmat m 0 0\nreadf m [\"/nonexistent/dir/table.csv\"]");
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn input_reads_one_number_per_line() {
    let (result, output, context) =
        execute("mvar a b 0\ninput a [\"First: \"]\ninput b [\"Second: \"]", "4\n-2.5\n");
    assert!(result.is_ok());
    assert_eq!(output, "First: Second: ");
    assert_eq!(context.symbols.scalar_value("a"), Some(4.0));
    assert_eq!(context.symbols.scalar_value("b"), Some(-2.5));

    let (result, _, _) = execute("cvar a 0\ninput a [\"? \"]", "four\n");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Format);
}

#[test]
fn inverse_trig_outside_its_domain_fails() {
    assert_eq!(error_of("cvar x 0\nasin x 2").kind(), ErrorKind::Domain);
    assert_eq!(output_of("cvar x 0\nacos x 1\nprintv x"), "0");
}

#[test]
fn math_builtins() {
    let source = "\
mvar a b c d 0
xroot a 32 5
log b 8 2
set c 2.346
round c 0.01
set d -3.5
ceil d
";
    let context = context_of(source);
    assert!((context.symbols.scalar_value("a").unwrap() - 2.0).abs() < 1e-12);
    assert!((context.symbols.scalar_value("b").unwrap() - 3.0).abs() < 1e-12);
    assert!((context.symbols.scalar_value("c").unwrap() - 2.35).abs() < 1e-9);
    assert_eq!(context.symbols.scalar_value("d"), Some(-3.0));
}

#[test]
fn random_respects_its_bounds() {
    for _ in 0..50 {
        let context = context_of("cvar x 0\nrandom x 5 1");
        let x = context.symbols.scalar_value("x").unwrap();
        assert!((1.0..=5.0).contains(&x));
    }
}

#[test]
fn random_over_the_whole_float_range_fails_cleanly() {
    let err = error_of("cvar x 0\nrandom x 1e308 -1e308");
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn constants_are_predeclared() {
    assert_eq!(output_of("printv cpi"), std::f64::consts::PI.to_string());
    assert_eq!(error_of("cvar ce 1").kind(), ErrorKind::Name);
}

#[test]
fn keywords_are_case_insensitive_and_may_be_glued() {
    let output = output_of("CVAR X 2\nIF(X>1)do [\nPRINT[\"Big\"]\n]\nprintb[\"done\"]");
    assert_eq!(output, "Big\ndone");
}

#[test]
fn carriage_returns_are_lex_errors() {
    let err = error_of("cvar x 1\r\nprintv x");
    assert_eq!(err.kind(), ErrorKind::Lex);
    assert_eq!(err.kind().exit_code(), 2);
}

#[test]
fn syntax_errors_are_collected() {
    let err = error_of("cvar x\nnewl 2\nfoo");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.to_string().lines().count(), 3);
}

#[test]
fn malformed_expressions_are_format_errors() {
    assert_eq!(error_of("printv (1+2").kind(), ErrorKind::Format);
    assert_eq!(error_of("printv 1+$").kind(), ErrorKind::Format);
    assert_eq!(error_of("cmat m 1 1\nprintv m[0][0][0]").kind(), ErrorKind::Format);
    assert_eq!(error_of("cvar x 1\nset 2 x").kind(), ErrorKind::Format);
}

#[test]
fn arguments_fill_the_reserved_list() {
    let buffer = SharedBuffer::default();
    let mut context =
        Context::with_io(Cursor::new(""), buffer.clone()).with_arguments(vec![2.0, 3.0]);
    run_with_context("printv args[0]*args[1]", &mut context).unwrap();
    assert_eq!(String::from_utf8(buffer.0.borrow().clone()).unwrap(), "6");
}

#[test]
fn output_is_flushed_before_errors_surface() {
    let (result, output, _) = execute("print [\"before\"]\nclist xs 1\nprintv xs[3]", "");
    assert!(result.is_err());
    assert_eq!(output, "before\n");
}

struct UnflushableOutput;

impl Write for UnflushableOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

#[test]
fn failed_final_flush_is_an_io_error_without_a_line() {
    let mut context = Context::with_io(Cursor::new(""), UnflushableOutput);
    let err = run_with_context("printb [\"x\"]", &mut context).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("disk full"));
    assert!(!err.to_string().contains("line"));
}
