//! Qualitative readings of coefficient values.

/// Grade a percent-agreement rate.
pub fn agreement_grade(rate: f64) -> &'static str {
    if rate >= 0.95 {
        "Excellent agreement"
    } else if rate >= 0.85 {
        "Good agreement"
    } else if rate >= 0.70 {
        "Moderate agreement"
    } else if rate >= 0.50 {
        "Fair agreement"
    } else {
        "Poor agreement"
    }
}

/// Interpret a kappa value (Landis & Koch, 1977).
pub fn kappa_interpretation(kappa: f64) -> &'static str {
    if kappa < 0.0 {
        "Less than chance agreement"
    } else if kappa < 0.20 {
        "Slight agreement"
    } else if kappa < 0.40 {
        "Fair agreement"
    } else if kappa < 0.60 {
        "Moderate agreement"
    } else if kappa < 0.80 {
        "Substantial agreement"
    } else {
        "Almost perfect agreement"
    }
}

/// Interpret Krippendorff's alpha (Krippendorff, 2004: 0.800 / 0.667 cut-offs).
pub fn alpha_interpretation(alpha: f64) -> &'static str {
    if alpha >= 0.800 {
        "Reliable agreement"
    } else if alpha >= 0.667 {
        "Tentative agreement"
    } else {
        "Unreliable agreement"
    }
}

/// Bucket a gold-standard F1 score.
pub fn f1_rating(f1: f64) -> &'static str {
    if f1 >= 0.9 {
        "Excellent"
    } else if f1 >= 0.8 {
        "Good"
    } else if f1 >= 0.7 {
        "Fair"
    } else if f1 >= 0.6 {
        "Moderate"
    } else if f1 >= 0.5 {
        "Poor"
    } else {
        "Very poor"
    }
}
