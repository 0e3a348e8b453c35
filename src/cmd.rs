use argh::FromArgs;
use log::error;
use randqueue::{permutation, uniformity};
use std::io;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(description = "CLI for randqueue")]
struct Global {
    #[argh(subcommand)]
    nested: SubCommands,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommands {
    Permutation(Permutation),
    Uniformity(Uniformity),
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "permutation",
    description = "print k items read from stdin, chosen uniformly at random"
)]
struct Permutation {
    #[argh(positional, description = "number of items to print")]
    k: usize,

    #[argh(
        option,
        short = 's',
        long = "seed",
        description = "seed for the random order"
    )]
    seed: Option<u64>,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "uniformity",
    description = "count how often sample returns each item"
)]
struct Uniformity {
    #[argh(
        option,
        short = 's',
        long = "seed",
        description = "seed for the sampling workers"
    )]
    seed: Option<u64>,

    #[argh(
        option,
        short = 't',
        long = "trials",
        description = "number of samples to draw"
    )]
    trials: Option<usize>,

    #[argh(
        option,
        short = 'i',
        long = "items",
        description = "comma separated items to sample from"
    )]
    items: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct PermutationOptions {
    pub k: usize,
    pub seed: u64,
}

impl PermutationOptions {
    fn new(k: usize) -> Self {
        Self {
            k,
            seed: rand::random(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct UniformityOptions {
    pub seed: u64,
    pub trials: usize,
    pub items: Vec<String>,
}

impl Default for UniformityOptions {
    fn default() -> Self {
        Self {
            seed: rand::random(),
            trials: 10_000,
            items: ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn parse_items(items: &str) -> Vec<String> {
    items
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn permutation_options(permutation: Permutation) -> PermutationOptions {
    let mut options = PermutationOptions::new(permutation.k);
    if let Some(seed) = permutation.seed {
        options.seed = seed;
    }
    options
}

fn uniformity_options(uniformity: Uniformity) -> UniformityOptions {
    let mut options = UniformityOptions::default();
    if let Some(seed) = uniformity.seed {
        options.seed = seed;
    }
    if let Some(trials) = uniformity.trials {
        options.trials = trials;
    }
    if let Some(items) = uniformity.items {
        options.items = parse_items(&items);
    }
    options
}

pub fn run() {
    let args: Global = argh::from_env();
    match args.nested {
        SubCommands::Permutation(flags) => {
            let options = permutation_options(flags);
            let stdin = io::stdin();
            let mut stdout = io::stdout().lock();
            if let Err(e) = permutation::run(options.k, options.seed, stdin.lock(), &mut stdout) {
                error!("Permutation failed: {}", e);
                std::process::exit(1);
            }
        }
        SubCommands::Uniformity(flags) => {
            let options = uniformity_options(flags);
            if options.items.is_empty() {
                error!("Invalid items: at least one item is required");
                std::process::exit(1);
            }
            match uniformity::run(&options.items, options.trials, options.seed) {
                Ok(frequencies) => println!("{}", frequencies),
                Err(e) => {
                    error!("Uniformity run failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
