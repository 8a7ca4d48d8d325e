use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use speech_coordinator::{
    Config, MockEngine, PropertyStore, RecognitionEngine, Recognizer, RecognizerSite,
};
use tracing::info;

#[derive(Parser)]
#[command(about = "Speech recognition session coordinator demo (mock engine)")]
struct Args {
    /// Config file name, resolved by the config crate (extension optional)
    #[arg(long, default_value = "config/speech-coordinator")]
    config: String,

    /// Run continuous recognition for a short while instead of single-shot
    #[arg(long)]
    continuous: bool,

    /// Spot this keyword instead of running single-shot recognition
    #[arg(long)]
    keyword: Option<String>,

    /// Phrases the mock engine should "hear" (repeatable)
    #[arg(long = "phrase")]
    phrases: Vec<String>,
}

/// Demo site: a root property store plus a mock engine factory
struct DemoSite {
    properties: Arc<PropertyStore>,
    phrases: Vec<String>,
}

#[async_trait::async_trait]
impl RecognizerSite for DemoSite {
    fn parent_properties(&self) -> Arc<PropertyStore> {
        Arc::clone(&self.properties)
    }

    async fn create_engine(&self) -> Result<Box<dyn RecognitionEngine>> {
        Ok(Box::new(MockEngine::new(self.phrases.clone()).with_partials()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let cfg = Config::load(&args.config).unwrap_or_default();
    let properties = PropertyStore::new();
    cfg.apply_to(&properties);

    let phrases = if args.phrases.is_empty() {
        vec![
            "hello world".to_string(),
            "this is a recognition demo".to_string(),
        ]
    } else {
        args.phrases
    };

    let recognizer = Arc::new(Recognizer::new());
    recognizer.init(Arc::new(DemoSite { properties, phrases }));

    // Print every event the coordinator fans out
    let mut events = recognizer.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("event: {:?}", event);
        }
    });

    if args.continuous {
        let run = recognizer.start_continuous_recognition().await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        recognizer.stop_continuous_recognition().await.wait().await?;
        run.wait().await?;
        info!("Continuous recognition finished");
    } else if let Some(keyword) = &args.keyword {
        let run = recognizer.start_keyword_recognition(keyword).await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        recognizer.stop_keyword_recognition().await.wait().await?;
        run.wait().await?;
        info!("Keyword spotting for '{}' finished", keyword);
    } else {
        let result = recognizer.recognize_async().await.wait().await?;
        info!(
            "Recognized: \"{}\" (confidence {:?})",
            result.text, result.confidence
        );
    }

    recognizer.term().await;
    printer.abort();

    Ok(())
}
