use clap::{Args as ClapArgs, Parser, Subcommand};
use riffle_core::DecodeOptions;
use riffle_core::json::JsonOpts;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "riffle",
    about = "Inspect RIFF chunk streams (WAV, AVI, WebP, SoundFont, ...)",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Dump a file or directory as JSON
    Dump(DumpArgs),
    /// Print the value at a JSON pointer of a file's dump
    Get(GetArgs),
    /// Print an indented chunk outline
    Tree(TreeArgs),
}

#[derive(ClapArgs, Debug)]
struct WalkArgs {
    /// Maximum LIST nesting to walk
    #[arg(long, default_value_t = 64)]
    max_nesting: usize,
    /// Max JSON depth to render
    #[arg(long, default_value_t = 16)]
    max_depth: usize,
    /// Emit full bytes instead of summaries
    #[arg(long, default_value_t = false)]
    bytes_full: bool,
    /// Do not add `text` previews for printable payloads
    #[arg(long, default_value_t = false)]
    no_text: bool,
}

impl WalkArgs {
    fn decode_opts(&self) -> DecodeOptions {
        DecodeOptions {
            max_depth: self.max_nesting,
        }
    }

    fn json_opts(&self) -> JsonOpts {
        JsonOpts {
            max_depth: self.max_depth,
            bytes_summary: !self.bytes_full,
            text_preview: !self.no_text,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct DumpArgs {
    /// RIFF file, or directory searched recursively for RIFF files
    path: PathBuf,
    #[command(flatten)]
    walk: WalkArgs,
}

#[derive(ClapArgs, Debug)]
struct GetArgs {
    /// RIFF file to load
    path: PathBuf,
    /// JSON Pointer, e.g. /chunks/0/children/1
    #[arg(long)]
    ptr: String,
    #[command(flatten)]
    walk: WalkArgs,
}

#[derive(ClapArgs, Debug)]
struct TreeArgs {
    /// RIFF file to outline
    path: PathBuf,
    /// Maximum LIST nesting to walk
    #[arg(long, default_value_t = 64)]
    max_nesting: usize,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.cmd {
        Cmd::Dump(a) => cmd_dump(a),
        Cmd::Get(a) => cmd_get(a),
        Cmd::Tree(a) => cmd_tree(a),
    }
}

fn cmd_dump(args: DumpArgs) {
    let p = args.path.as_path();
    let (decode_opts, json_opts) = (args.walk.decode_opts(), args.walk.json_opts());
    debug!(path = %p.display(), "dump");
    let res = if p.is_file() {
        riffle_core::json::dump_file_json(p, &decode_opts, json_opts).map_err(|e| e.to_string())
    } else if p.is_dir() {
        riffle_core::json::dump_dir_map_json(p, &decode_opts, json_opts).map_err(|e| e.to_string())
    } else {
        Err(format!("not found: {}", p.display()))
    };
    match res {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    }
}

fn cmd_get(args: GetArgs) {
    let v = riffle_core::json::parse_file_to_json_value(
        &args.path,
        &args.walk.decode_opts(),
        args.walk.json_opts(),
    )
    .unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    });
    match v.pointer(&args.ptr) {
        Some(x) => match serde_json::to_string_pretty(x) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(2);
            }
        },
        None => {
            eprintln!("not found: {}", args.ptr);
            std::process::exit(3);
        }
    }
}

fn cmd_tree(args: TreeArgs) {
    let data = std::fs::read(&args.path).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    });
    let opts = DecodeOptions {
        max_depth: args.max_nesting,
    };
    match riffle_core::read_tree(&data, &opts) {
        Ok(tree) => print!("{}", tree.pretty()),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(3);
        }
    }
}
