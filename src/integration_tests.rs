// Integration tests for end-to-end workflows over realistic feeds

#[cfg(test)]
mod integration_tests {
    use crate::basket::{aggregate, BasketConfig, BasketSelection, UnitWeight};
    use crate::config::PipelineConfig;
    use crate::feed::parse_feed;
    use crate::interpolation::build_period_series;
    use crate::period::{global_period_range, Granularity};
    use crate::pipeline::run_pipeline;
    use crate::series::SeriesSet;
    use crate::stats::{compute_all_stats, sort_stats, SortDirection, StatsColumn};

    const FEED: &str = "Filename,Date,Product,Price\n\
        jan.jpg,2022-01-15,Tuna,1.00\n\
        jan.jpg,2022-01-15,Large Eggs,2.50\n\
        jan.jpg,2022-01-15,Bananas lb,0.60\n\
        ,,,\n\
        jun.jpg,06/20/2022,Large Eggs,3.25\n\
        jun.jpg,06/20/2022,Large Eggs,2.75\n\
        \n\
        nov.jpg,2022-11-02,Tuna,1.30\n\
        feb.jpg,2023-02-10,Large Eggs,4.00\n\
        feb.jpg,2023-02-10,Bananas lb,0.66\n\
        feb.jpg,2023-02-10,Ghost Product,\n\
        bad.jpg,someday,Tuna,1.00\n";

    /// Every period series aligns with the global range, and estimate flags
    /// mark exactly the periods without real observations.
    #[test]
    fn test_period_series_align_with_global_range() {
        let observations = parse_feed(FEED);
        let set = SeriesSet::from_observations(&observations);
        let periods = global_period_range(Granularity::Quarter, &set);

        // Q1-2022 through Q1-2023
        assert_eq!(periods.len(), 5);

        for series in set.iter() {
            let built = build_period_series(series, &periods);
            assert_eq!(built.values.len(), periods.len());

            for value in &built.values {
                let observed = series
                    .observations
                    .iter()
                    .any(|obs| value.period.contains(obs.date));
                assert_eq!(value.is_estimated, !observed, "{} {}", series.product, value.period);
            }
        }
    }

    /// Leading runs take their right bound and trailing runs their left bound.
    #[test]
    fn test_edges_carry_nearest_value() {
        let observations = parse_feed(FEED);
        let set = SeriesSet::from_observations(&observations);
        let periods = global_period_range(Granularity::Quarter, &set);

        // Tuna: Q1-2022 = 1.00, Q4-2022 = 1.30, nothing in Q1-2023
        let tuna = build_period_series(&set.series("Tuna"), &periods);
        let values: Vec<Option<f64>> = tuna.values.iter().map(|v| v.value).collect();
        assert_eq!(values[0], Some(1.0));
        assert_eq!(values[3], Some(1.3));
        assert_eq!(values[4], Some(1.3));
        let q2 = values[1].unwrap();
        let q3 = values[2].unwrap();
        assert!(1.0 < q2 && q2 < q3 && q3 < 1.3);

        // Large Eggs: Q2-2022 averages two same-day observations
        let eggs = build_period_series(&set.series("Large Eggs"), &periods);
        assert_eq!(eggs.values[1].value, Some(3.0));
        assert!(!eggs.values[1].is_estimated);
    }

    #[test]
    fn test_stats_across_feed() {
        let observations = parse_feed(FEED);
        let stats = compute_all_stats(&SeriesSet::from_observations(&observations));

        let names: Vec<&str> = stats.iter().map(|s| s.product.as_str()).collect();
        assert_eq!(names, vec!["Bananas lb", "Large Eggs", "Tuna"]);

        let eggs = &stats[1];
        assert_eq!(eggs.observation_count, 4);
        assert_eq!(eggs.first_price, 2.5);
        assert_eq!(eggs.latest_price, 4.0);
        assert_eq!(eggs.average_price, 3.13);

        let by_count = sort_stats(&stats, StatsColumn::ObservationCount, SortDirection::Descending);
        assert_eq!(by_count[0].product, "Large Eggs");
    }

    #[test]
    fn test_basket_totals_with_unit_weight() {
        let config = PipelineConfig::new(
            Granularity::Year,
            BasketConfig {
                selection: BasketSelection::curated(["Tuna", "Bananas lb", "Walnuts"]),
                unit_weight: Some(UnitWeight {
                    product: "Bananas lb".to_string(),
                    multiplier: 5.0,
                }),
            },
        );
        let output = run_pipeline(FEED, &config);
        let result = output.aggregate();

        let labels: Vec<String> = result.periods.iter().map(|p| p.to_string()).collect();
        assert_eq!(labels, vec!["2022", "2023"]);
        // 2022: Tuna avg 1.15 + bananas 0.60 * 5; 2023: Tuna carried 1.15 + 0.66 * 5
        assert_eq!(result.totals, vec![4.15, 4.45]);

        // Recomputing from the table's own series gives the same totals
        let again = aggregate(&output.periods, &output.basket.products, &config.basket);
        assert_eq!(again, result);
    }

    #[test]
    fn test_threshold_basket() {
        let config = PipelineConfig::new(
            Granularity::Quarter,
            BasketConfig {
                selection: BasketSelection::threshold(3),
                unit_weight: None,
            },
        );
        let output = run_pipeline(FEED, &config);
        let products: Vec<&str> = output
            .basket
            .products
            .iter()
            .map(|p| p.product.as_str())
            .collect();
        assert_eq!(products, vec!["Large Eggs"]);
    }
}
