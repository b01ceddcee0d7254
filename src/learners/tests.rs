#[cfg(test)]
mod learner_tests {
    use crate::data::Dataset;
    use crate::errors::ReinaError;
    use crate::learners::{SLearner, TLearner};
    use crate::model::{GradientBoostedTreeRegressor, LinearRegression, LogisticRegression};
    use crate::utils::mean;

    fn dataset(columns: Vec<(&str, Vec<f64>)>) -> Dataset {
        let (names, data): (Vec<String>, Vec<Vec<f64>>) =
            columns.into_iter().map(|(n, c)| (n.to_string(), c)).unzip();
        Dataset::from_columns(names, data).unwrap()
    }

    /// y = 1.5 + 0.5 x + effect * w, exactly linear, with alternating assignment.
    fn constant_effect_data(n: usize, effect: f64) -> Dataset {
        let x: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let w: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .zip(&w)
            .map(|(x_, w_)| 1.5 + 0.5 * x_ + effect * w_)
            .collect();
        dataset(vec![("x", x), ("w", w), ("y", y)])
    }

    fn exact_linear() -> LinearRegression {
        LinearRegression::default().set_alpha(0.0)
    }

    // -----------------------------------------------------------------------
    // SLearner
    // -----------------------------------------------------------------------

    #[test]
    fn test_s_learner_recovers_constant_effect() {
        let data = constant_effect_data(200, 2.0);
        let mut learner = SLearner::new(exact_linear());
        learner.fit(&data, &["w"], "y").expect("Fit failed");

        let effects = learner.effects(&data, "w").expect("Effects failed");
        assert_eq!(effects.cate.len(), 200);
        assert!((effects.ate - 2.0).abs() < 1e-8, "ATE should be 2.0, got {}", effects.ate);
        for cate in &effects.cate {
            assert!((cate - 2.0).abs() < 1e-8);
        }
    }

    #[test]
    fn test_s_learner_scores_data_without_treatment_column() {
        let data = constant_effect_data(100, 1.0);
        let mut learner = SLearner::new(exact_linear());
        learner.fit(&data, &["w"], "y").expect("Fit failed");

        // The treatment column is overwritten with constants, so scoring
        // data only needs the covariates.
        let scoring = dataset(vec![("x", vec![0.1, 0.5, 0.9])]);
        let effects = learner.effects(&scoring, "w").expect("Effects failed");
        assert_eq!(effects.cate.len(), 3);
        assert!((effects.ate - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_s_learner_multiple_treatments() {
        // y = 1.0 + 2 x + 2 w1 + 3 w2 with mutually orthogonal assignment
        // patterns, so each single-treatment fit stays nearly unbiased even
        // though the other treatment is excluded from its covariates.
        let n = 400;
        let x: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let w1: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let w2: Vec<f64> = (0..n).map(|i| ((i / 2) % 2) as f64).collect();
        let y: Vec<f64> = (0..n)
            .map(|i| 1.0 + 2.0 * x[i] + 2.0 * w1[i] + 3.0 * w2[i])
            .collect();
        let data = dataset(vec![("x", x), ("w1", w1), ("w2", w2), ("y", y)]);

        let mut learner = SLearner::new(exact_linear());
        learner.fit(&data, &["w1", "w2"], "y").expect("Fit failed");
        assert_eq!(learner.covariates(), &["x".to_string()]);

        let first = learner.effects(&data, "w1").expect("Effects failed");
        let second = learner.effects(&data, "w2").expect("Effects failed");
        assert!((first.ate - 2.0).abs() < 0.1, "ATE of w1 should be near 2.0, got {}", first.ate);
        assert!((second.ate - 3.0).abs() < 0.1, "ATE of w2 should be near 3.0, got {}", second.ate);
    }

    #[test]
    fn test_s_learner_with_boosted_trees() {
        let data = constant_effect_data(300, 2.0);
        let model = GradientBoostedTreeRegressor::default().set_n_rounds(50);
        let mut learner = SLearner::new(model);
        learner.fit(&data, &["w"], "y").expect("Fit failed");

        let effects = learner.effects(&data, "w").expect("Effects failed");
        assert_eq!(effects.cate.len(), 300);
        assert!(effects.cate.iter().all(|c| c.is_finite()));
        assert!(
            (effects.ate - 2.0).abs() < 0.5,
            "boosted ATE should be near 2.0, got {}",
            effects.ate
        );
    }

    #[test]
    fn test_s_learner_logistic_risk_difference() {
        // Binary outcome follows the treatment except for one flipped row
        // in ten per arm: P(y|w=1) = 0.9 and P(y|w=0) = 0.1, so the risk
        // difference is 0.8.
        let n = 100;
        let x: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let w: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let y: Vec<f64> = (0..n)
            .map(|i| {
                let flipped = i % 20 == 0 || i % 20 == 5;
                if flipped {
                    1.0 - w[i]
                } else {
                    w[i]
                }
            })
            .collect();
        let data = dataset(vec![("x", x), ("w", w), ("y", y)]);

        let mut learner = SLearner::new(LogisticRegression::default());
        learner.fit(&data, &["w"], "y").expect("Fit failed");

        let effects = learner.effects(&data, "w").expect("Effects failed");
        assert!(effects.cate.iter().all(|c| (-1.0..=1.0).contains(c)));
        assert!(
            (effects.ate - 0.8).abs() < 0.1,
            "risk difference should be near 0.8, got {}",
            effects.ate
        );
    }

    // -----------------------------------------------------------------------
    // TLearner
    // -----------------------------------------------------------------------

    #[test]
    fn test_t_learner_recovers_constant_effect() {
        let data = constant_effect_data(200, 2.0);
        let mut learner = TLearner::new(exact_linear(), exact_linear());
        learner.fit(&data, &["w"], "y").expect("Fit failed");

        let effects = learner.effects(&data, "w").expect("Effects failed");
        assert!((effects.ate - 2.0).abs() < 1e-8, "ATE should be 2.0, got {}", effects.ate);
    }

    #[test]
    fn test_t_learner_recovers_heterogeneous_effect() {
        // y = x * w: treated outcomes follow y = x, control outcomes are 0,
        // so CATE(x) = x.
        let n = 200;
        let x: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let w: Vec<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let y: Vec<f64> = x.iter().zip(&w).map(|(x_, w_)| x_ * w_).collect();
        let data = dataset(vec![("x", x.clone()), ("w", w), ("y", y)]);

        let mut learner = TLearner::new(exact_linear(), exact_linear());
        learner.fit(&data, &["w"], "y").expect("Fit failed");

        let effects = learner.effects(&data, "w").expect("Effects failed");
        for (cate, x_) in effects.cate.iter().zip(&x) {
            assert!((cate - x_).abs() < 1e-8, "CATE should equal x, got {cate} at {x_}");
        }
        assert!((effects.ate - mean(&x)).abs() < 1e-8);
    }

    #[test]
    fn test_t_learner_empty_arm() {
        let n = 50;
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let w = vec![1.0; n];
        let y = vec![0.0; n];
        let data = dataset(vec![("x", x), ("w", w), ("y", y)]);

        let mut learner = TLearner::new(exact_linear(), exact_linear());
        assert!(matches!(
            learner.fit(&data, &["w"], "y"),
            Err(ReinaError::EmptyTreatmentArm(_, 0))
        ));
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_effects_before_fit() {
        let data = constant_effect_data(10, 1.0);
        let learner = SLearner::new(exact_linear());
        assert!(matches!(learner.effects(&data, "w"), Err(ReinaError::NotFitted)));
    }

    #[test]
    fn test_unknown_treatment() {
        let data = constant_effect_data(10, 1.0);
        let mut learner = SLearner::new(exact_linear());
        learner.fit(&data, &["w"], "y").expect("Fit failed");
        assert!(matches!(
            learner.effects(&data, "z"),
            Err(ReinaError::UnknownTreatment(_, _))
        ));
    }

    #[test]
    fn test_non_binary_treatment() {
        let data = dataset(vec![
            ("x", vec![1.0, 2.0, 3.0]),
            ("w", vec![0.0, 1.0, 2.0]),
            ("y", vec![0.0, 1.0, 2.0]),
        ]);
        let mut learner = SLearner::new(exact_linear());
        assert!(matches!(
            learner.fit(&data, &["w"], "y"),
            Err(ReinaError::NonBinaryTreatment(_, v)) if v == 2.0
        ));

        let data = dataset(vec![
            ("x", vec![1.0, 2.0, 3.0]),
            ("w", vec![0.0, 1.0, f64::NAN]),
            ("y", vec![0.0, 1.0, 2.0]),
        ]);
        let mut learner = TLearner::new(exact_linear(), exact_linear());
        assert!(matches!(
            learner.fit(&data, &["w"], "y"),
            Err(ReinaError::NonBinaryTreatment(_, _))
        ));
    }

    #[test]
    fn test_missing_columns() {
        let data = constant_effect_data(10, 1.0);
        let mut learner = SLearner::new(exact_linear());
        assert!(matches!(
            learner.fit(&data, &["w"], "nope"),
            Err(ReinaError::ColumnNotFound(_))
        ));
        assert!(matches!(
            learner.fit(&data, &["missing"], "y"),
            Err(ReinaError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_no_covariates() {
        let data = dataset(vec![("w", vec![0.0, 1.0]), ("y", vec![0.0, 1.0])]);
        let mut learner = SLearner::new(exact_linear());
        assert!(matches!(
            learner.fit(&data, &["w"], "y"),
            Err(ReinaError::EmptyData(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    #[test]
    fn test_json_round_trip() {
        let data = constant_effect_data(100, 2.0);
        let mut learner = SLearner::new(exact_linear());
        learner.fit(&data, &["w"], "y").expect("Fit failed");
        let expected = learner.effects(&data, "w").expect("Effects failed");

        let dumped = learner.json_dump().expect("Dump failed");
        let restored: SLearner<LinearRegression> = SLearner::from_json(&dumped).expect("Load failed");
        let actual = restored.effects(&data, "w").expect("Effects failed");

        assert_eq!(expected.cate.len(), actual.cate.len());
        for (e, a) in expected.cate.iter().zip(&actual.cate) {
            assert!((e - a).abs() < 1e-12);
        }
    }

    #[test]
    fn test_save_and_load() {
        let data = constant_effect_data(50, 1.0);
        let mut learner = TLearner::new(exact_linear(), exact_linear());
        learner.fit(&data, &["w"], "y").expect("Fit failed");

        let path = std::env::temp_dir().join("reina_tlearner_test.json");
        learner.save(&path).expect("Save failed");
        let restored: TLearner<LinearRegression> = TLearner::load(&path).expect("Load failed");
        std::fs::remove_file(&path).ok();

        let expected = learner.effects(&data, "w").expect("Effects failed");
        let actual = restored.effects(&data, "w").expect("Effects failed");
        assert!((expected.ate - actual.ate).abs() < 1e-12);
    }
}
