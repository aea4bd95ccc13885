//! Shared prediction pipeline used by every CLI command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! raw record -> encode/scale -> assemble -> predict -> round
//!
//! The front-ends only deal with where records come from and how results are shown.

use std::sync::Arc;

use rayon::prelude::*;

use crate::domain::{PredictionResult, RatingPolicy, RawInputRecord};
use crate::error::PipelineError;
use crate::features::{FeatureVector, ScalingTable, assemble, encode_record};
use crate::io::batch::{BatchOutcome, BatchRow};
use crate::models::Predictor;

/// Everything a request needs, built once at startup and only read afterwards.
#[derive(Clone)]
pub struct PipelineContext {
    pub scaling: ScalingTable,
    pub rating_policy: RatingPolicy,
    predictor: Option<Arc<dyn Predictor>>,
}

impl PipelineContext {
    pub fn new(
        scaling: ScalingTable,
        rating_policy: RatingPolicy,
        predictor: Option<Arc<dyn Predictor>>,
    ) -> Self {
        Self {
            scaling,
            rating_policy,
            predictor,
        }
    }

    pub fn predictor(&self) -> Option<&Arc<dyn Predictor>> {
        self.predictor.as_ref()
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("scaling", &self.scaling)
            .field("rating_policy", &self.rating_policy)
            .field("predictor", &self.predictor.as_ref().map(|p| p.describe()))
            .finish()
    }
}

/// Turns raw records into rounded predictions.
#[derive(Debug, Clone)]
pub struct PredictionService {
    context: PipelineContext,
}

impl PredictionService {
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Whether prediction requests can be accepted at all.
    pub fn is_ready(&self) -> bool {
        self.context.predictor.is_some()
    }

    /// Encode and assemble a record without predicting.
    pub fn prepare(&self, record: &RawInputRecord) -> Result<FeatureVector, PipelineError> {
        let values = encode_record(record, &self.context.scaling, self.context.rating_policy)?;
        let vector = assemble(&values)?;
        log::debug!("assembled feature vector: {:?}", vector.as_slice());
        Ok(vector)
    }

    /// Run `vector` through the predictor as a one-row batch.
    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionResult, PipelineError> {
        let predictor = self.predictor()?;
        run_predictor(predictor.as_ref(), vector)
    }

    /// Full pipeline for one record.
    ///
    /// The predictor is checked before the record is touched.
    pub fn predict_record(&self, record: RawInputRecord) -> Result<PredictionResult, PipelineError> {
        let predictor = self.predictor()?;
        let vector = self.prepare(&record)?;
        run_predictor(predictor.as_ref(), &vector)
    }

    /// Predict every row in parallel. Row failures are reported per row.
    pub fn predict_batch(&self, rows: Vec<BatchRow>) -> Result<Vec<BatchOutcome>, PipelineError> {
        let predictor = self.predictor()?;
        let outcomes = rows
            .into_par_iter()
            .map(|row| {
                let result = self
                    .prepare(&row.record)
                    .and_then(|vector| run_predictor(predictor.as_ref(), &vector));
                if let Err(e) = &result {
                    log::warn!("batch line {}: {e}", row.line);
                }
                BatchOutcome {
                    line: row.line,
                    id: row.id,
                    result,
                }
            })
            .collect();
        Ok(outcomes)
    }

    fn predictor(&self) -> Result<&Arc<dyn Predictor>, PipelineError> {
        self.context
            .predictor
            .as_ref()
            .ok_or(PipelineError::PredictorUnavailable)
    }
}

fn run_predictor(predictor: &dyn Predictor, vector: &FeatureVector) -> Result<PredictionResult, PipelineError> {
    let output = predictor
        .predict(&vector.to_batch())
        .map_err(|e| PipelineError::Prediction(e.to_string()))?;

    let raw = match output.as_slice() {
        [value] => *value,
        other => {
            return Err(PipelineError::Prediction(format!(
                "predictor returned {} values for a batch of one",
                other.len()
            )));
        }
    };

    if !raw.is_finite() {
        return Err(PipelineError::Prediction(format!("non-finite prediction {raw}")));
    }

    Ok(PredictionResult::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use nalgebra::DMatrix;

    use super::*;
    use crate::domain::FeatureName;
    use crate::features::layout::{CATEGORICAL_FEATURES, FEATURE_COUNT, RATING_FEATURES};
    use crate::models::{LinearModel, PredictorError};

    /// Returns fixed outputs and remembers the batch shapes it saw.
    struct StubPredictor {
        output: Vec<f64>,
        seen: Mutex<Vec<(usize, usize)>>,
    }

    impl StubPredictor {
        fn returning(output: Vec<f64>) -> Arc<Self> {
            Arc::new(Self {
                output,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(usize, usize)> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Predictor for StubPredictor {
        fn predict(&self, batch: &DMatrix<f64>) -> Result<Vec<f64>, PredictorError> {
            self.seen.lock().unwrap().push((batch.nrows(), batch.ncols()));
            Ok(self.output.clone())
        }
    }

    struct FailingPredictor;

    impl Predictor for FailingPredictor {
        fn predict(&self, _batch: &DMatrix<f64>) -> Result<Vec<f64>, PredictorError> {
            Err(PredictorError("shape mismatch".to_string()))
        }
    }

    fn full_record() -> RawInputRecord {
        let mut record = RawInputRecord::new();
        record.insert("age", "46");
        record.insert("flight_distance", "885");
        record.insert("arrival_delay", "0");
        for name in RATING_FEATURES {
            record.insert(name.input_key(), "3");
        }
        for name in CATEGORICAL_FEATURES {
            record.insert(name.input_key(), "1");
        }
        record
    }

    fn service_with(predictor: Option<Arc<dyn Predictor>>) -> PredictionService {
        PredictionService::new(PipelineContext::new(
            ScalingTable::standard(),
            RatingPolicy::PassThrough,
            predictor,
        ))
    }

    #[test]
    fn end_to_end_rounds_stub_output() {
        let stub = StubPredictor::returning(vec![7.345]);
        let service = service_with(Some(stub.clone()));

        let result = service.predict_record(full_record()).unwrap();
        assert_eq!(result.value, 7.35);
        assert_eq!(result.raw, 7.345);
        assert_eq!(stub.calls(), vec![(1, FEATURE_COUNT)]);
    }

    #[test]
    fn prepared_vector_has_expected_values() {
        let service = service_with(None);
        let vector = service.prepare(&full_record()).unwrap();
        assert_eq!(vector.len(), FEATURE_COUNT);
        assert!((vector.get(FeatureName::Age).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(vector.get(FeatureName::ArrivalDelay), Some(0.0));
        assert!(vector.as_slice()[3..17].iter().all(|&v| v == 3.0));
        assert!(vector.as_slice()[17..].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn invalid_input_never_reaches_predictor() {
        let stub = StubPredictor::returning(vec![1.0]);
        let service = service_with(Some(stub.clone()));
        let mut record = full_record();
        record.insert("age", "not-a-number");

        let err = service.predict_record(record).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidInput {
                field: "age".to_string(),
                value: Some("not-a-number".to_string()),
            }
        );
        assert!(stub.calls().is_empty());
    }

    #[test]
    fn missing_predictor_is_reported_before_processing() {
        let service = service_with(None);
        assert!(!service.is_ready());

        // Even a record that would fail to encode reports the missing predictor.
        let err = service.predict_record(RawInputRecord::new()).unwrap_err();
        assert_eq!(err, PipelineError::PredictorUnavailable);

        let vector = service.prepare(&full_record()).unwrap();
        assert_eq!(service.predict(&vector), Err(PipelineError::PredictorUnavailable));
    }

    #[test]
    fn predictor_failure_is_surfaced() {
        let service = service_with(Some(Arc::new(FailingPredictor)));
        let err = service.predict_record(full_record()).unwrap_err();
        assert_eq!(err, PipelineError::Prediction("shape mismatch".to_string()));
    }

    #[test]
    fn wrong_batch_size_or_non_finite_output_is_an_error() {
        let service = service_with(Some(StubPredictor::returning(vec![1.0, 2.0])));
        assert!(matches!(
            service.predict_record(full_record()),
            Err(PipelineError::Prediction(_))
        ));

        let service = service_with(Some(StubPredictor::returning(vec![])));
        assert!(matches!(
            service.predict_record(full_record()),
            Err(PipelineError::Prediction(_))
        ));

        let service = service_with(Some(StubPredictor::returning(vec![f64::NAN])));
        assert!(matches!(
            service.predict_record(full_record()),
            Err(PipelineError::Prediction(_))
        ));
    }

    #[test]
    fn linear_model_sees_canonical_positions() {
        // Only "Class" carries weight, so the result is the Class input itself.
        let mut coefficients = vec![0.0; FEATURE_COUNT];
        coefficients[FEATURE_COUNT - 1] = 1.0;
        let service = service_with(Some(Arc::new(LinearModel::new(0.25, coefficients))));

        let mut record = full_record();
        record.insert("class_type", "2");
        let result = service.predict_record(record).unwrap();
        assert_eq!(result.value, 2.25);
    }

    #[test]
    fn batch_reports_each_row() {
        let service = service_with(Some(StubPredictor::returning(vec![4.0])));
        let mut bad = full_record();
        bad.insert("gender", "male");

        let rows = vec![
            BatchRow { line: 2, id: Some("a".to_string()), record: full_record() },
            BatchRow { line: 3, id: None, record: bad },
            BatchRow { line: 4, id: Some("c".to_string()), record: full_record() },
        ];
        let outcomes = service.predict_batch(rows).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].line, 2);
        assert_eq!(outcomes[0].result, Ok(PredictionResult::from_raw(4.0)));
        assert_eq!(outcomes[1].result, Err(PipelineError::invalid_input("gender", "male")));
        assert_eq!(outcomes[2].id.as_deref(), Some("c"));
    }

    #[test]
    fn batch_without_predictor_is_refused() {
        let service = service_with(None);
        let rows = vec![BatchRow { line: 2, id: None, record: full_record() }];
        assert_eq!(service.predict_batch(rows).unwrap_err(), PipelineError::PredictorUnavailable);
    }
}
