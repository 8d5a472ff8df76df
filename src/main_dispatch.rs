use predict_client::adapters::PredictionApiClient;
use predict_client::cli::output::{self, OutputMode};
use predict_client::cli::{interactive, load_inputs, parse_assignment, Cli, Commands, Target};
use predict_client::config::AppConfig;
use predict_client::domain::{ImageBlob, SubmissionStatus, FEATURE_SPECS};
use predict_client::error::Result;
use predict_client::workflow::{FeatureFormWorkflow, ImageUploadWorkflow, InMemoryPreviewStore};
use std::path::PathBuf;
use tracing::{error, info};

/// Run one command. `Ok(false)` means it ran but did not succeed.
pub(crate) async fn run(cli: &Cli, mut config: AppConfig) -> Result<bool> {
    let mode = OutputMode::from_json_flag(cli.json);

    match &cli.command {
        Commands::Specs => {
            output::print_specs(&FEATURE_SPECS, mode)?;
            Ok(true)
        }
        Commands::Features {
            set,
            input,
            interactive,
            url,
        } => {
            if let Some(url) = url {
                config.services.features.base_url = url.clone();
            }
            run_features(&config, set, input.as_ref(), *interactive, mode).await
        }
        Commands::Image { paths, url } => {
            if let Some(url) = url {
                config.services.image.base_url = url.clone();
            }
            run_image(&config, paths, mode).await
        }
        Commands::Ping { target, url } => {
            let service = match target {
                Target::Features => &mut config.services.features,
                Target::Image => &mut config.services.image,
            };
            if let Some(url) = url {
                service.base_url = url.clone();
            }
            let client = PredictionApiClient::new(service, &config.request)?;
            match client.health().await {
                Ok(message) => {
                    match mode {
                        OutputMode::Json => println!("{}", serde_json::json!({ "message": message })),
                        OutputMode::Pretty => println!("{}", message),
                    }
                    Ok(true)
                }
                Err(failure) => {
                    output::print_failure(&failure.user_message(), None, mode)?;
                    Ok(false)
                }
            }
        }
    }
}

async fn run_features(
    config: &AppConfig,
    set: &[String],
    input: Option<&PathBuf>,
    prompt: bool,
    mode: OutputMode,
) -> Result<bool> {
    let client = PredictionApiClient::new(&config.services.features, &config.request)?;
    let mut form = FeatureFormWorkflow::default()
        .with_probability_policy(config.render.probability_policy);

    if let Some(path) = input {
        for (name, raw) in load_inputs(path)? {
            form.edit(&name, raw)?;
        }
    }

    for assignment in set {
        let (name, raw) = parse_assignment(assignment)?;
        form.edit(&name, raw)?;
    }

    if prompt {
        interactive::fill_form(&mut form)?;
    }

    info!(fields = form.state().inputs.len(), "submitting feature form");
    let status = form.submit(&client).await;
    output::print_form(&form, mode)?;

    Ok(status == SubmissionStatus::Succeeded)
}

async fn run_image(config: &AppConfig, paths: &[PathBuf], mode: OutputMode) -> Result<bool> {
    let client = PredictionApiClient::new(&config.services.image, &config.request)?;
    let store = InMemoryPreviewStore::new();
    let mut upload = ImageUploadWorkflow::from_config(store.clone(), &config.upload);
    let mut all_succeeded = true;

    for path in paths {
        let blob = match ImageBlob::from_path(path) {
            Ok(blob) => blob,
            Err(e) => {
                error!(path = %path.display(), "could not read image: {}", e);
                output::print_failure(&e.to_string(), Some(path.as_path()), mode)?;
                all_succeeded = false;
                continue;
            }
        };

        if !upload.pick_file(Some(blob)) {
            let reason = upload.state().last_error.clone().unwrap_or_default();
            output::print_failure(&reason, Some(path.as_path()), mode)?;
            all_succeeded = false;
            continue;
        }

        let status = upload.submit(&client).await;
        output::print_upload(&upload, mode)?;
        all_succeeded &= status == SubmissionStatus::Succeeded;
    }

    upload.reset();
    info!(
        created = store.created(),
        revoked = store.revoked(),
        "image previews released"
    );

    Ok(all_succeeded)
}
