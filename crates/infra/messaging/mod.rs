pub mod telegram_bot;
