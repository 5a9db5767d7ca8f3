use clap::Parser;
use string_set::StringSet;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "count", default_value_t = 100_000)]
    count: usize,

    #[arg(short = 'p', long = "prefix", default_value = "xxxxxxxxxxxxxxxxx")]
    prefix: String,

    /// Reserve room for every key up front instead of growing on demand.
    #[arg(short = 'r', long = "reserve")]
    reserve: bool,
}

fn main() {
    let args = Args::parse();

    let mut set: StringSet = StringSet::new();
    if args.reserve {
        set.reserve(args.count);
    }

    println!(
        "Inserting {} keys of the form \"{}<n>\"...",
        args.count, args.prefix
    );

    let mut max_chain_ratio = 0.0f64;
    let mut growths = 0;
    for i in 0..args.count {
        let buckets = set.bucket_count();
        set.insert(&format!("{}{}", args.prefix, i));
        if set.bucket_count() != buckets {
            growths += 1;
        }
        max_chain_ratio = max_chain_ratio.max(set.chain_count() as f64 / set.len() as f64);
    }

    println!(
        "Inserted {} keys into {} buckets ({} resizes)",
        set.len(),
        set.bucket_count(),
        growths
    );
    println!(
        "Final load factor: {:.2}%",
        (set.len() as f64 / set.bucket_count() as f64) * 100.0
    );
    println!("Max chain ratio seen: {:.2}%", max_chain_ratio * 100.0);

    set.print_depth_histogram();
    set.debug_stats().print();

    let mut scanned = 0;
    let mut steps = 0;
    let mut cursor = 0;
    loop {
        cursor = set.scan(cursor, |_| scanned += 1);
        steps += 1;
        if cursor == 0 {
            break;
        }
    }
    println!("Full scan: {} values in {} steps", scanned, steps);
    assert_eq!(scanned, set.len(), "scan must visit every value once");
}
