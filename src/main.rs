use std::io::{self, Read};

use clap::{Args, Parser as ClapParser, Subcommand};
use rql_lang::{
    CompileOptions, ParserOptions, StringifyOptions,
    cli::{self, CheckOptions, CheckResult, CliError, OutputMode},
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "rql")]
#[command(about = "RQL - A URL-safe resource query language with FIQL shorthand")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct QueryArg {
    /// The query text (reads from stdin if not provided)
    query: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate query syntax
    Check {
        #[command(flatten)]
        input: QueryArg,
    },

    /// Print the term tree as JSON
    Parse {
        #[command(flatten)]
        input: QueryArg,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Decode %3C, %3E, %3C= and %3E= into operators
        #[arg(long)]
        json_query: bool,

        /// Disable the a=b / a=op=b shorthand
        #[arg(long)]
        no_fiql: bool,

        /// Read a/b/c as (a,b,c)
        #[arg(long)]
        slashed_arrays: bool,

        /// Accept empty arguments such as a,,b
        #[arg(long)]
        allow_empty: bool,

        /// Converter for values without a prefix
        #[arg(long, default_value = "auto")]
        default_converter: String,
    },

    /// Print the query in canonical form
    Format {
        #[command(flatten)]
        input: QueryArg,

        /// Percent-encode values twice
        #[arg(long)]
        double_encode: bool,
    },

    /// Compile the query to a document-store query
    Compile {
        #[command(flatten)]
        input: QueryArg,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Honor where() terms
        #[arg(long)]
        allow_where: bool,

        /// Merge nested and groups instead of emitting $and
        #[arg(long)]
        compact_and: bool,

        /// Only allow these field paths
        #[arg(long, value_delimiter = ',')]
        whitelist: Option<Vec<String>>,

        /// Reject these field paths
        #[arg(long, value_delimiter = ',')]
        blacklist: Option<Vec<String>>,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'rql docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { input } => read_query(input).and_then(|query| {
            run(CheckOptions {
                query,
                mode: OutputMode::Syntax,
                ..CheckOptions::default()
            })
        }),
        Commands::Parse {
            input,
            pretty,
            json_query,
            no_fiql,
            slashed_arrays,
            allow_empty,
            default_converter,
        } => read_query(input).and_then(|query| {
            run(CheckOptions {
                query,
                mode: OutputMode::Tree,
                parser: ParserOptions {
                    json_query_compatible: json_query,
                    fiql_compatible: !no_fiql,
                    allow_slashed_arrays: slashed_arrays,
                    allow_empty_values: allow_empty,
                    default_converter,
                    ..ParserOptions::default()
                },
                pretty,
                ..CheckOptions::default()
            })
        }),
        Commands::Format {
            input,
            double_encode,
        } => read_query(input).and_then(|query| {
            run(CheckOptions {
                query,
                mode: OutputMode::Text,
                stringify: StringifyOptions { double_encode },
                ..CheckOptions::default()
            })
        }),
        Commands::Compile {
            input,
            pretty,
            allow_where,
            compact_and,
            whitelist,
            blacklist,
        } => read_query(input).and_then(|query| {
            run(CheckOptions {
                query,
                mode: OutputMode::Mongo,
                compile: CompileOptions {
                    allow_where,
                    compact_and,
                    whitelist: whitelist.map(|paths| paths.into_iter().collect()),
                    blacklist: blacklist.map(|paths| paths.into_iter().collect()),
                    is_property_allowed: None,
                },
                pretty,
                ..CheckOptions::default()
            })
        }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_query(input: QueryArg) -> Result<String, CliError> {
    match input.query {
        Some(query) => Ok(query),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn run(options: CheckOptions) -> Result<(), CliError> {
    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Text(text) => println!("{}", text),
        CheckResult::Json(output) => {
            let json = if options.pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}
