use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use hprofconv_core::{ConvertOptions, Converter};
use hprofconv_utils::{error, info, init_logging, init_logging_with_level, warn, LogFormat, LogLevel, LoggingError};

/// Convert binary HPROF heap dumps into the legacy ASCII heap dump format.
///
/// Each input `<file>` is converted to `<file>.txt`. An existing output is kept
/// as `<file>.txt.prev`.
#[derive(Parser, Debug)]
#[command(name = "hprofconv")]
#[command(version)]
#[command(about = "Convert binary HPROF heap dumps into the legacy ASCII heap dump format", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli
{
    /// Write the ASCII dump. Without this the inputs are only parsed
    #[arg(long, default_value_t = false)]
    convert: bool,
    /// Print the contents of every String to stdout
    #[arg(long, default_value_t = false)]
    dump_string: bool,
    /// Print every char array to stdout
    #[arg(long, default_value_t = false)]
    dump_char_array: bool,
    /// Print every string record to stdout
    #[arg(long, default_value_t = false)]
    dump_name: bool,
    /// Report object sizes without object header overhead
    #[arg(long, default_value_t = false)]
    no_header_size: bool,
    /// Log every decoded record (trace level)
    #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
    verbose: bool,
    /// Log warnings and errors only
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
    /// Log format: pretty or json
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
    /// Binary HPROF files to convert
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl Cli
{
    fn options(&self) -> ConvertOptions
    {
        ConvertOptions::default()
            .with_emit_output(self.convert)
            .with_header_size(!self.no_header_size)
            .with_dump_char_arrays(self.dump_char_array)
            .with_resolve_strings(self.dump_string)
            .with_dump_names(self.dump_name)
    }

    fn init_logging(&self) -> Result<(), LoggingError>
    {
        let level = if self.verbose {
            Some(LogLevel::Trace)
        } else if self.quiet {
            Some(LogLevel::Warn)
        } else {
            None
        };
        let format = self.log_format.or_else(LogFormat::from_env).unwrap_or(LogFormat::Pretty);

        match (level, self.log_format) {
            (Some(level), _) => init_logging_with_level(level, format),
            (None, Some(format)) => init_logging_with_level(LogLevel::Info, format),
            // RUST_LOG and HPROFCONV_LOG_FORMAT decide
            (None, None) => init_logging(),
        }
    }
}

fn main()
{
    let cli = Cli::parse();

    if let Err(e) = cli.init_logging() {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    let converter = Converter::new(cli.options());
    let stdout = io::stdout();
    let mut console = stdout.lock();
    let mut failed = 0usize;

    for path in &cli.files {
        if !path.is_file() {
            warn!(input = %path.display(), "input file not found, skipped");
            failed += 1;
            continue;
        }

        match converter.convert_file(path, &mut console) {
            Ok(report) => {
                let total = report.metadata_pass + report.emit_pass;
                match &report.output_path {
                    Some(output) => info!(input = %path.display(), output = %output.display(), ?total, "converted"),
                    None => info!(input = %path.display(), ?total, "parsed"),
                }
            }
            Err(e) => {
                error!(input = %path.display(), "conversion failed: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        error!(failed, total = cli.files.len(), "some inputs were not converted");
        process::exit(1);
    }
}
