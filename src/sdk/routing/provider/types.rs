use serde::Deserialize;

// --- Google Directions ---

#[derive(Deserialize, Debug)]
pub struct GoogleDirections {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<GoogleRoute>,
}

#[derive(Deserialize, Debug)]
pub struct GoogleRoute {
    pub overview_polyline: GooglePolyline,
    #[serde(default)]
    pub legs: Vec<GoogleLeg>,
}

#[derive(Deserialize, Debug)]
pub struct GooglePolyline {
    pub points: String,
}

#[derive(Deserialize, Debug)]
pub struct GoogleLeg {
    pub distance: GoogleValue,
    pub duration: GoogleValue,
    #[serde(default)]
    pub steps: Vec<GoogleStep>,
}

#[derive(Deserialize, Debug)]
pub struct GoogleStep {
    #[serde(default)]
    pub html_instructions: String,
    pub distance: GoogleValue,
    pub start_location: GoogleLatLng,
}

/// `{ "value": 1234, "text": "1.2 km" }`; only the SI value is used.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct GoogleValue {
    pub value: f64,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct GoogleLatLng {
    pub lat: f64,
    pub lng: f64,
}

// --- HERE Routing v8 ---

#[derive(Deserialize, Debug)]
pub struct HereResponse {
    #[serde(default)]
    pub routes: Vec<HereRoute>,
    #[serde(default)]
    pub notices: Vec<HereNotice>,
}

#[derive(Deserialize, Debug)]
pub struct HereNotice {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Deserialize, Debug)]
pub struct HereRoute {
    #[serde(default)]
    pub sections: Vec<HereSection>,
}

#[derive(Deserialize, Debug)]
pub struct HereSection {
    pub polyline: String,
    pub summary: HereSummary,
    #[serde(default)]
    pub actions: Vec<HereAction>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct HereSummary {
    /// meters
    pub length: f64,
    /// seconds
    pub duration: f64,
}

#[derive(Deserialize, Debug)]
pub struct HereAction {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub instruction: Option<String>,
    /// Index into the section polyline.
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub length: f64,
}

// --- OSRM ---

#[derive(Deserialize, Debug)]
pub struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Deserialize, Debug)]
pub struct OsrmRoute {
    pub geometry: String,
    pub distance: f64,
    pub duration: f64,
    #[serde(default)]
    pub legs: Vec<OsrmLeg>,
}

#[derive(Deserialize, Debug)]
pub struct OsrmLeg {
    #[serde(default)]
    pub steps: Vec<OsrmStep>,
}

#[derive(Deserialize, Debug)]
pub struct OsrmStep {
    #[serde(default)]
    pub name: String,
    pub distance: f64,
    pub maneuver: OsrmManeuver,
}

#[derive(Deserialize, Debug)]
pub struct OsrmManeuver {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub modifier: Option<String>,
    /// `[lon, lat]`
    pub location: [f64; 2],
}

// --- GraphHopper ---

#[derive(Deserialize, Debug)]
pub struct GraphHopperResponse {
    #[serde(default)]
    pub paths: Vec<GraphHopperPath>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct GraphHopperPath {
    /// meters
    pub distance: f64,
    /// milliseconds
    pub time: f64,
    pub points: GraphHopperPoints,
    #[serde(default)]
    pub instructions: Vec<GraphHopperInstruction>,
}

#[derive(Deserialize, Debug)]
pub struct GraphHopperPoints {
    /// `[lon, lat]` or `[lon, lat, ele]`
    pub coordinates: Vec<Vec<f64>>,
}

#[derive(Deserialize, Debug)]
pub struct GraphHopperInstruction {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub street_name: String,
    pub distance: f64,
    pub interval: [usize; 2],
}
