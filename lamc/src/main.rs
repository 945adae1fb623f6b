use std::time::Instant;

use clap::{Parser, Subcommand};
use log::info;
use thiserror::Error;

use lamc_core::ast::{Expr, ExprBuilder};
use lamc_core::{diags, Ast};

/// Times the execution of a closure and prints the elapsed time if verbose.
fn time<T, F: FnOnce() -> T>(name: &str, verbose: bool, f: F) -> T {
    let start = Instant::now();
    let result = f();
    if verbose {
        let elapsed = start.elapsed().as_micros();
        eprintln!("{}: {}us", name, elapsed);
    }
    result
}

#[derive(Parser)]
#[command(name = "lamc")]
#[command(about = "A toy typed-lambda-calculus compiler with a CPS middle end", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in sample programs
    List,

    /// Run a sample program through the whole pipeline
    Run {
        /// Sample name (see `list`)
        name: String,

        /// Print the surface AST as an S-expression
        #[arg(long)]
        dump_ast: bool,

        /// Print the CPS term right after translation
        #[arg(long)]
        dump_cps: bool,

        /// Print the CPS term after all rewriting passes
        #[arg(long)]
        dump_opt: bool,

        /// Skip target-code emission
        #[arg(long)]
        no_emit: bool,

        /// Print verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Error)]
enum DriverError {
    #[error("unknown sample: {0} (try `lamc list`)")]
    UnknownSample(String),

    #[error("compilation error: {0}")]
    CompilationError(#[from] lamc_core::error::CompilerError),
}

type Sample = fn(&mut ExprBuilder) -> Expr;

fn samples() -> Vec<(&'static str, &'static str, Sample)> {
    vec![
        ("literal-add", "23 + 42", sample_literal_add),
        ("let-chain", "nested lets over a literal", sample_let_chain),
        ("tuple-project", "project the middle of a triple", sample_tuple_project),
        ("higher-order", "define a doubling function and call it", sample_higher_order),
        (
            "channel-current",
            "ion-channel current kernel over two tuple parameters",
            sample_channel_current,
        ),
        ("ill-typed", "adds a float to a bool; fails in the checker", sample_ill_typed),
    ]
}

fn sample_literal_add(b: &mut ExprBuilder) -> Expr {
    let lhs = b.f64(23.0);
    let rhs = b.f64(42.0);
    b.add(lhs, rhs)
}

fn sample_let_chain(b: &mut ExprBuilder) -> Expr {
    let lhs = b.f64(23.0);
    let rhs = b.var("b");
    let body = b.add(lhs, rhs);
    let a = b.var("a");
    let inner = b.let_in("b", a, body);
    let two = b.f64(2.0);
    b.let_in("a", two, inner)
}

fn sample_tuple_project(b: &mut ExprBuilder) -> Expr {
    let one = b.f64(1.0);
    let two = b.f64(2.0);
    let three = b.f64(3.0);
    let triple = b.tuple(vec![one, two, three]);
    let t = b.var("t");
    let body = b.project(1, t);
    b.let_in("t", triple, body)
}

fn sample_higher_order(b: &mut ExprBuilder) -> Expr {
    let x = b.var("x");
    let x2 = b.var("x");
    let body = b.add(x, x2);
    let f = b.var("f");
    let arg = b.f64(42.0);
    let call = b.apply(f, vec![arg]);
    b.defn("f", &["x"], body, call)
}

/// The Ih current kernel: projects simulator and mechanism state out of two
/// tuple parameters and returns the updated current/conductance pair.
/// `sim_g` is deliberately left free, as in the original kernel.
fn sample_channel_current(b: &mut ExprBuilder) -> Expr {
    let i_new = b.var("i_new");
    let g_new = b.var("g_new");
    let result = b.tuple(vec![i_new, g_new]);

    let sim_g = b.var("sim_g");
    let gbar = b.var("mech_gbar");
    let m = b.var("mech_m");
    let gm = b.mul(gbar, m);
    let g_value = b.add(sim_g, gm);
    let with_g = b.let_in("g_new", g_value, result);

    let sim_i = b.var("sim_i");
    let gbar = b.var("mech_gbar");
    let m = b.var("mech_m");
    let gm = b.mul(gbar, m);
    let sim_v = b.var("sim_v");
    let ehcn = b.var("mech_ehcn");
    let dv = b.sub(sim_v, ehcn);
    let drive = b.mul(gm, dv);
    let i_value = b.add(sim_i, drive);
    let with_i = b.let_in("i_new", i_value, with_g);

    let mech = b.var("mech");
    let with_ehcn = b.pi("mech_ehcn", 2, mech, with_i);
    let mech = b.var("mech");
    let with_gbar = b.pi("mech_gbar", 1, mech, with_ehcn);
    let mech = b.var("mech");
    let with_m = b.pi("mech_m", 0, mech, with_gbar);
    let sim = b.var("sim");
    let with_sim_i = b.pi("sim_i", 1, sim, with_m);
    let sim = b.var("sim");
    let with_sim_v = b.pi("sim_v", 0, sim, with_sim_i);

    b.lambda(&["sim", "mech"], with_sim_v)
}

fn sample_ill_typed(b: &mut ExprBuilder) -> Expr {
    let lhs = b.f64(1.0);
    let rhs = b.boolean(true);
    b.add(lhs, rhs)
}

fn main() -> Result<(), DriverError> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            for (name, description, _) in samples() {
                println!("{:16} {}", name, description);
            }
            Ok(())
        }
        Commands::Run {
            name,
            dump_ast,
            dump_cps,
            dump_opt,
            no_emit,
            verbose,
        } => run_sample(&name, dump_ast, dump_cps, dump_opt, no_emit, verbose),
    }
}

fn run_sample(
    name: &str,
    dump_ast: bool,
    dump_cps: bool,
    dump_opt: bool,
    no_emit: bool,
    verbose: bool,
) -> Result<(), DriverError> {
    let build = samples()
        .into_iter()
        .find(|(sample_name, _, _)| *sample_name == name)
        .map(|(_, _, build)| build)
        .ok_or_else(|| DriverError::UnknownSample(name.to_string()))?;

    let mut builder = ExprBuilder::new();
    let expr = build(&mut builder);

    if dump_ast {
        println!("{}", diags::expr_to_sexp(&expr));
    }

    let typed = time("typecheck", verbose, || Ast::new(expr).typecheck())?;
    if verbose {
        info!("program type: {}", typed.ty);
    }

    let renamed = time("alpha_convert", verbose, || typed.alpha_convert());
    let converted = time("ast_to_cps", verbose, || renamed.to_cps())?;
    if dump_cps {
        println!("{}", converted.term);
    }

    let pruned = time("dead_let", verbose, || converted.dead_let());
    let cont_reduced = time("beta_cont", verbose, || pruned.beta_cont())?;
    let func_reduced = time("beta_func", verbose, || cont_reduced.beta_func())?;
    let deduped = time("prim_cse", verbose, || func_reduced.prim_cse());
    let folded = time("prim_simplify", verbose, || deduped.prim_simplify())?;
    if dump_opt {
        println!("{}", folded.term);
    }

    if !no_emit {
        let source = time("generate", verbose, || folded.generate())?;
        print!("{}", source);
    }

    Ok(())
}
