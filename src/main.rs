use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use log::{debug, info};

use bdd_abstract::bdd::Bdd;
use bdd_abstract::builder::build;
use bdd_abstract::enumerate::enumerate;
use bdd_abstract::error::Error;
use bdd_abstract::parser::{parse_file, read_visible_file};
use bdd_abstract::projector::VariableProjector;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// BDD dump written by the model checker (`dump_fsm -r` in NuSMV).
    #[arg(value_name = "DUMP")]
    input: PathBuf,

    /// Visible variables: one base name per line.
    #[arg(value_name = "VISIBLE")]
    visible: PathBuf,

    /// BDD size (in bits, so the node table starts with `2^size` nodes).
    #[arg(long, value_name = "INT", default_value_t = 20, value_parser = clap::value_parser!(u32).range(..=31))]
    storage_bits: u32,

    /// Level of the diagnostics written to stderr.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: simplelog::LevelFilter,

    /// Also write the abstracted diagram as a dump to this file.
    #[arg(long, value_name = "PATH")]
    dump: Option<PathBuf>,
}

fn report(path: &Path, err: &Error) -> ExitCode {
    eprintln!("{}:{}", path.display(), err);
    ExitCode::FAILURE
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                e.print()?;
                return Ok(ExitCode::FAILURE);
            }
        },
    };

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();
    debug!("args = {:?}", args);

    info!("parsing {}...", args.input.display());
    let model = match parse_file(&args.input) {
        Ok(model) => model,
        Err(e) => return Ok(report(&args.input, &e)),
    };
    let visible = match read_visible_file(&args.visible) {
        Ok(visible) => visible,
        Err(e) => return Ok(report(&args.visible, &e)),
    };
    let num_vars = model.ordering.len();
    info!(
        "{} variables, {} decision nodes, {} visible names",
        num_vars,
        model.nodes.len(),
        visible.len()
    );

    let bdd = Bdd::new(args.storage_bits as usize);
    let root = match build(&model, &bdd) {
        Ok(root) => root,
        Err(e) => return Ok(report(&args.input, &e)),
    };
    info!("rebuilt diagram of size {}", bdd.size(root));
    debug!("{} satisfying assignments", bdd.sat_count(root, num_vars));

    let projector = VariableProjector::new(&model.ordering, &visible);
    info!(
        "{} visible and {} free variables",
        projector.visible_indices().len(),
        projector.free_indices().len()
    );

    let abstracted = projector.abstract_root(&bdd, root);
    info!(
        "abstracted diagram of size {} with {} visible assignments",
        bdd.size(abstracted),
        bdd.sat_count(abstracted, num_vars) >> projector.free_indices().len()
    );
    debug!("bdd = {:?}", bdd);

    if let Some(path) = &args.dump {
        let dump = bdd.to_dump(abstracted, &model.ordering)?;
        fs::write(path, dump).wrap_err_with(|| format!("cannot write {}", path.display()))?;
        info!("abstracted diagram written to {}", path.display());
    }

    {
        let mut out = BufWriter::new(io::stdout().lock());
        let mut assignments = enumerate(&bdd, abstracted, num_vars, projector.visible_indices());
        let mut count: u64 = 0;
        for line in assignments.by_ref() {
            writeln!(out, "{}", line)?;
            count += 1;
        }
        out.flush()?;
        info!("printed {} assignments from {} cubes", count, assignments.num_cubes());
    }

    bdd.collect_garbage(&[]);
    debug!("bdd = {:?}", bdd);

    info!("All done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(ExitCode::SUCCESS)
}
