pub mod calendar;
pub mod error;
pub mod market_data;
pub mod notification;
pub mod telegram;
pub mod yahoo;

pub use calendar::{NyseCalendar, TradingCalendar};
pub use error::{NotifyError, ProviderError};
pub use market_data::{MarketDataProvider, StaticMarketDataProvider};
pub use notification::{Destination, LogNotifier, Notifier};
pub use telegram::TelegramNotifier;
pub use yahoo::YahooMarketDataProvider;
