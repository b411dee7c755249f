mod common;

use anyhow::Result;
use common::{ChartEvent, FakeMarketApi, RecordingChartFactory};
use std::sync::Arc;
use std::time::{Duration, Instant};
use ticker_dash::config::config::{ChartSettings, SearchConfig};
use ticker_dash::controller::{SearchController, SearchPhase};
use ticker_dash::orchestrator::panels::{PanelBoard, PanelSpec};
use ticker_dash::orchestrator::WidgetOrchestrator;
use ticker_dash::quote::{present, QuoteFetcher};
use ticker_dash::resolver::TickerResolver;
use ticker_dash::symbol::Symbol;

fn tata_api() -> Arc<FakeMarketApi> {
    Arc::new(
        FakeMarketApi::new()
            .with_search("TAT", &[("Tatva Chintan", "TATVA.NS")])
            .with_search("TATA", &[("Tata Motors", "TATAMOTORS.NS"), ("Tata Steel", "TATASTEEL.NS")]),
    )
}

/// Type "TAT", let it fire, then type "TATA" and let that fire too
async fn two_searches(
    controller: &mut SearchController,
    resolver: &TickerResolver,
) -> Result<(u64, Vec<ticker_dash::resolver::Candidate>, u64, Vec<ticker_dash::resolver::Candidate>)> {
    let start = Instant::now();
    controller.on_input_changed("TAT", start);
    let first = controller
        .poll_debounce(start + Duration::from_millis(300))
        .ok_or_else(|| anyhow::anyhow!("first search not issued"))?;

    controller.on_input_changed("TATA", start + Duration::from_millis(350));
    let second = controller
        .poll_debounce(start + Duration::from_millis(700))
        .ok_or_else(|| anyhow::anyhow!("second search not issued"))?;

    let first_batch = resolver.resolve(&first.query).await;
    let second_batch = resolver.resolve(&second.query).await;
    Ok((first.token, first_batch, second.token, second_batch))
}

#[tokio::test]
async fn test_stale_batch_arriving_last_is_discarded() -> Result<()> {
    let resolver = TickerResolver::new(tata_api(), "IN", &SearchConfig::default());
    let mut controller = SearchController::new(300);
    let (tat, tat_batch, tata, tata_batch) = two_searches(&mut controller, &resolver).await?;

    assert!(controller.on_results(tata, tata_batch));
    assert!(!controller.on_results(tat, tat_batch));

    let names: Vec<&str> = controller
        .candidates()
        .iter()
        .map(|c| c.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Tata Motors", "Tata Steel"]);
    assert!(controller.dropdown_visible());
    Ok(())
}

#[tokio::test]
async fn test_stale_batch_arriving_first_is_discarded() -> Result<()> {
    let resolver = TickerResolver::new(tata_api(), "IN", &SearchConfig::default());
    let mut controller = SearchController::new(300);
    let (tat, tat_batch, tata, tata_batch) = two_searches(&mut controller, &resolver).await?;

    assert!(!controller.on_results(tat, tat_batch));
    assert!(controller.candidates().is_empty());
    assert!(controller.on_results(tata, tata_batch));

    assert_eq!(controller.candidates().len(), 2);
    assert_eq!(controller.candidates()[0].symbol.as_str(), "TATAMOTORS.NS");
    Ok(())
}

#[tokio::test]
async fn test_tcs_selection_drives_quote_and_widgets() -> Result<()> {
    let api = Arc::new(
        FakeMarketApi::new()
            .with_search("TCS", &[("Tata Consultancy Services", "TCS.NS")])
            .with_price("TCS.NS", 3912.5),
    );
    let config = SearchConfig {
        fetch_prices: false,
        ..SearchConfig::default()
    };
    let resolver = TickerResolver::new(api.clone(), "IN", &config);
    let quotes = QuoteFetcher::new(api.clone());
    let factory = RecordingChartFactory::new();
    let panels = PanelSpec::defaults();
    let mut board = PanelBoard::new(&panels);
    let mut orchestrator =
        WidgetOrchestrator::new(panels, ChartSettings::default(), Box::new(factory.clone()));
    let mut controller = SearchController::new(300);

    let start = Instant::now();
    controller.on_input_changed("TCS", start);
    let request = controller
        .poll_debounce(start + Duration::from_millis(300))
        .ok_or_else(|| anyhow::anyhow!("search not issued"))?;
    let batch = resolver.resolve(&request.query).await;
    assert!(controller.on_results(request.token, batch));

    let selection = controller
        .select(0)
        .ok_or_else(|| anyhow::anyhow!("nothing selected"))?;
    assert_eq!(selection.symbol.as_str(), "TCS.NS");
    assert_eq!(controller.input(), "Tata Consultancy Services");
    assert_eq!(controller.phase(), SearchPhase::Selected);
    assert!(!controller.dropdown_visible());

    let mut price_label = String::new();
    let price = quotes.fetch(&selection.symbol).await;
    present(price, &mut price_label);
    orchestrator.show(&selection.symbol, &mut board);

    assert_eq!(api.chart_calls(), vec!["TCS.NS".to_string()]);
    assert_eq!(price_label, "₹3912.50");
    assert_eq!(orchestrator.chart().map(|c| c.symbol()), Some("TCS"));
    assert!(matches!(
        factory.events().first(),
        Some(ChartEvent::Created { symbol, .. }) if symbol == "TCS"
    ));
    Ok(())
}

#[test]
fn test_restore_selects_without_dropdown() {
    let mut controller = SearchController::new(300);

    let selection = controller.restore(Symbol::parse("LTFOODS.NS").unwrap(), None);

    assert_eq!(selection.symbol.bare(), "LTFOODS");
    assert_eq!(controller.phase(), SearchPhase::Selected);
    assert!(!controller.dropdown_visible());
    assert!(controller.candidates().is_empty());
    assert!(controller.poll_debounce(Instant::now() + Duration::from_secs(1)).is_none());
}
