use argh::FromArgs;
use std::path::PathBuf;

use masklab::{
    imgproc::{
        filter::{
            params::{parse_mask_rows, FieldValue},
            FilterForm,
        },
        parallel::ExecutionStrategy,
        session::FilterSession,
    },
    io::functional as F,
};

#[derive(FromArgs)]
/// Apply a spatial filter mask to a grayscale image
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    image: Option<PathBuf>,

    /// the mask type: box, gaussian or custom
    #[argh(option, default = "String::from(\"box\")")]
    filter: String,

    /// the odd mask size, from 3 to 21
    #[argh(option, default = "3")]
    mask_size: usize,

    /// the gaussian sigma, or `auto` for mask_size / 6
    #[argh(option, default = "String::from(\"auto\")")]
    sigma: String,

    /// the value the custom mask is divided by
    #[argh(option, default = "String::from(\"1\")")]
    divisor: String,

    /// the custom mask cells, rows separated by `;`, e.g. "0 -1 0; -1 5 -1; 0 -1 0"
    #[argh(option)]
    mask: Option<String>,

    /// a JSON filter form; replaces the filter, mask-size, sigma, divisor and mask options
    #[argh(option)]
    config: Option<PathBuf>,

    /// where to write the filtered image
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// the number of worker threads, 0 runs on the main thread
    #[argh(option, default = "0")]
    threads: usize,

    /// print the kernel weights
    #[argh(switch)]
    show_kernel: bool,
}

fn form_from_args(args: &Args) -> FilterForm {
    let mut form = FilterForm::new(args.filter.as_str(), args.mask_size);
    form.sigma = Some(args.sigma.as_str().into());
    form.divisor = Some(args.divisor.as_str().into());
    form.mask = args.mask.as_deref().map(|text| {
        parse_mask_rows(text)
            .into_iter()
            .map(|row| row.into_iter().map(FieldValue::Text).collect::<Vec<_>>())
            .collect()
    });
    form
}

/// The form read from `--config`, or else the one built from the other options.
fn load_form(args: &Args) -> Result<FilterForm, Box<dyn std::error::Error>> {
    let form = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => form_from_args(args),
    };
    Ok(form)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let form = load_form(&args)?;
    log::debug!("filter form: {form:?}");

    let mut session =
        FilterSession::new().with_strategy(ExecutionStrategy::from_threads(args.threads));

    if let Some(path) = &args.image {
        let image = F::read_image_gray8(path)?;
        log::info!("loaded {} ({})", path.display(), image.size());
        session.set_image(image);
    }

    let output = session.apply_form(&form)?;

    if args.show_kernel {
        print!("{}", output.kernel);
    }
    println!(
        "Processing time: {:.4} seconds",
        output.elapsed.as_secs_f64()
    );

    if let Some(path) = &args.output {
        F::write_image_gray8(path, &output.image)?;
        log::info!("saved filtered image to {}", path.display());
    }

    Ok(())
}
