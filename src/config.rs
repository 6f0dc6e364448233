use crate::classifier::NluSettings;
use crate::error::DispatchResult;
use crate::weather::WeatherSettings;

/// Bot configuration, read once at process start and passed into the
/// constructors that need it.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub nlu: NluSettings,
    pub weather: WeatherSettings,
}

impl BotSettings {
    pub fn new(nlu: NluSettings, weather: WeatherSettings) -> Self {
        Self { nlu, weather }
    }

    /// Read every setting from `PALAVER_*` environment variables. Missing
    /// required values fail startup with a binding error.
    pub fn from_env() -> DispatchResult<Self> {
        Ok(Self {
            nlu: NluSettings::from_env()?,
            weather: WeatherSettings::from_env()?,
        })
    }
}
