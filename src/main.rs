use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use memorial::cli::{Cli, Commands};
use memorial::commands::{self, Memorial, PREVIEW_LENGTH};
use memorial::corpus::Testimony;
use memorial::search::SearchFilters;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("MEMORIAL_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_testimony_line(t: &Testimony) {
    println!(
        "{} [{}] {} by {} ({}), page {}",
        t.id, t.category, t.title, t.author, t.relationship, t.page
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let Some(command) = cli.command else {
        Cli::parse_from(["memorial", "--help"]);
        return Ok(());
    };

    let app = Memorial::load()?;

    match command {
        Commands::Search {
            query,
            category,
            relationship,
            author,
            tags,
            sort,
            page,
            per_page,
            json,
        } => {
            let filters = SearchFilters {
                category,
                relationship,
                author,
                tags,
            };
            let results = app
                .search(&query, &filters, sort, page, per_page)
                .map_err(|e| anyhow::anyhow!("Search failed: {e}"))?;

            if json {
                return print_json(&results);
            }

            if results.items.is_empty() {
                println!("No matches found for '{query}'");
                return Ok(());
            }

            for result in &results.items {
                let t = result.testimony;
                println!("## {} ({})", commands::highlighted_title(result), t.id);
                print!("{} ({}), page {}, {}", t.author, t.relationship, t.page, t.category);
                match result.score {
                    Some(score) => println!(", score {score:.4}"),
                    None => println!(),
                }
                println!("{}\n", commands::preview(result, PREVIEW_LENGTH));
            }
            println!(
                "*{} result(s) found* (page {} of {})",
                results.total_items,
                results.page,
                results.total_pages.max(1)
            );
        }
        Commands::List {
            category,
            chapter,
            json,
        } => {
            let testimonies = app.list(category, chapter.as_deref());
            if json {
                return print_json(&testimonies);
            }
            if testimonies.is_empty() {
                println!("No testimonies found");
            }
            for t in testimonies {
                print_testimony_line(t);
            }
        }
        Commands::Chapters { json } => {
            let chapters = app.chapters();
            if json {
                return print_json(&chapters);
            }
            for chapter in &chapters {
                let slug = if chapter.slug.is_empty() {
                    "(none)"
                } else {
                    chapter.slug
                };
                println!("{slug} ({})", chapter.testimonies.len());
                for t in &chapter.testimonies {
                    println!("  {}", t.id);
                }
            }
        }
        Commands::Get { id, json } => {
            let detail = app.get(&id)?;
            if json {
                return print_json(&detail);
            }

            let t = detail.testimony;
            println!("# {}", t.title);
            println!("{} ({}), page {}, {}", t.author, t.relationship, t.page, t.category);
            if !t.tags.is_empty() {
                println!("Tags: {}", t.tags.join(", "));
            }
            println!("\n{}\n", t.content);
            for image in &detail.gallery {
                println!("{}  {}", image.path, image.caption);
            }
        }
        Commands::Options { json } => {
            let options = app.filter_options();
            if json {
                return print_json(&options);
            }

            let categories: Vec<&str> = options.categories.iter().map(|c| c.as_str()).collect();
            println!("Categories: {}", categories.join(", "));
            println!("Relationships: {}", options.relationships.join(", "));
            println!("Authors: {}", options.authors.join(", "));
            println!("Tags: {}", options.tags.join(", "));
        }
        Commands::Stats { json } => {
            let stats = app.stats();
            if json {
                return print_json(&stats);
            }

            println!("Total: {}", stats.total);
            for (category, count) in &stats.by_category {
                println!("{category}: {count}");
            }
        }
        Commands::Featured { count, json } => {
            let featured = app.featured(count);
            if json {
                return print_json(&featured);
            }
            for t in featured {
                print_testimony_line(t);
            }
        }
        Commands::Images {
            page,
            to,
            all,
            json,
        } => {
            let images = match page {
                Some(page) if !all => app.page_images(page, to),
                _ => app.all_images(),
            };
            if json {
                return print_json(&images);
            }
            if images.is_empty() {
                println!("No images found");
            }
            for image in images {
                println!("{image}");
            }
        }
        #[cfg(feature = "mcp")]
        Commands::Serve => {
            return tokio::runtime::Runtime::new()?.block_on(memorial::mcp::serve(app));
        }
    }

    Ok(())
}
