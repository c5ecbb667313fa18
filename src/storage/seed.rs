use field_report_common::{Report, ReportStatus, ReportType};

/// 初回起動時に登録するサンプルレポート
pub fn sample_reports() -> Vec<Report> {
    vec![Report {
        id: "RPT-2025-001".to_string(),
        report_type: ReportType::FieldInspection,
        date: "2025-04-21".to_string(),
        time_range: "10:30AM to 1:30PM".to_string(),
        project_name: "SPLOST II Pedestrian sidewalk improvement Project".to_string(),
        job_id: "N/A".to_string(),
        owner_developer: "City Of Clarkston".to_string(),
        project_address: "Brockett Rd".to_string(),
        stage_of_construction: "Demolition".to_string(),
        project_type: "Pedestrian sidewalk improvement Project".to_string(),
        inspection_type: "Field Inspection".to_string(),
        weather: "Windy / 63 F".to_string(),
        photos_taken: true,
        visual_inspection_issue: "N/A".to_string(),
        inspector_name: "Tirth Patel".to_string(),
        inspector_phone: "832-848-5569".to_string(),
        inspector_email: "patel@co-infra-services.com".to_string(),
        signature: String::new(),
        general_comments: [
            "The inspector confirmed that the Construction 57 (Contractor) crew has started sidewalk demolition near 4 Sisters Asian Grocery.",
            "The inspector confirmed that Construction 57 (Contractor) installed temporary traffic control signs on Brockett Road as required.",
            "The inspector confirmed that the Construction 57 (Contractor) crew cleaned the construction site following the completion of their work.",
        ]
        .join("\n\n"),
        images: Vec::new(),
        status: ReportStatus::Completed,
        created_at: chrono::Utc::now().timestamp_millis(),
    }]
}
