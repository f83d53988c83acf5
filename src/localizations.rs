use std::collections::HashMap;

use i18n_embed::DesktopLanguageRequester;
use unic_langid::{langid, LanguageIdentifier};

use audioconvert::classifier::{
    CONVERSION_FAILED, MALFORMED_RESPONSE, SERVER_MISCONFIGURED, UNKNOWN_FAILURE,
    UNREACHABLE_BACKEND, URL_NOT_PROCESSED,
};
use audioconvert::download::{DownloadError, DOWNLOAD_FAILED, NO_DOWNLOAD_URL};
use audioconvert::validation::{EMPTY_INPUT, INVALID_URL};

const FALLBACK_LANGUAGE: &str = "en-US";

// Fixed messages produced by the library, keyed to their translations.
const MESSAGE_KEYS: [(&str, &str); 10] = [
    (EMPTY_INPUT, "error-empty-input"),
    (INVALID_URL, "error-invalid-url"),
    (CONVERSION_FAILED, "error-conversion-failed"),
    (UNREACHABLE_BACKEND, "error-unreachable"),
    (MALFORMED_RESPONSE, "error-malformed"),
    (UNKNOWN_FAILURE, "error-unknown"),
    (SERVER_MISCONFIGURED, "error-server-misconfigured"),
    (URL_NOT_PROCESSED, "error-url-not-processed"),
    (NO_DOWNLOAD_URL, "error-no-download-url"),
    (DOWNLOAD_FAILED, "error-download-failed"),
];

// Simple in-memory translations
#[derive(Default)]
pub struct Translations {
    strings: HashMap<&'static str, &'static str>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: &'static str) {
        self.strings.insert(key, value);
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.strings.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &&'static str> {
        self.strings.keys()
    }
}

pub struct Localizations {
    translations: HashMap<&'static str, Translations>,
    current_lang: String,
}

fn english() -> Translations {
    let mut en = Translations::new();
    en.insert("app-title", "AudioConvert");
    en.insert("app-subtitle", "Convert audio and video files or links to the format you need.");
    en.insert("drop-title", "Drag and drop a file here");
    en.insert("drop-hover", "Release to select this file");
    en.insert("browse-file", "Browse files...");
    en.insert("selected-file", "Selected file:");
    en.insert("clear-file", "Remove");
    en.insert("url-label", "Or paste a YouTube, SoundCloud, or Spotify URL:");
    en.insert("url-placeholder", "https://www.youtube.com/watch?v=...");
    en.insert("format-label", "Convert to:");
    en.insert("format-mp3", "MP3 - Compact size, good quality");
    en.insert("format-wav", "WAV - Lossless audio format");
    en.insert("format-aac", "AAC - Advanced Audio Coding");
    en.insert("format-flac", "FLAC - Free Lossless Audio Codec");
    en.insert("download-to", "Save downloads to:");
    en.insert("browse-button", "Browse...");
    en.insert("convert-button", "Convert");
    en.insert("converting-button", "Converting...");
    en.insert("status-ready", "Ready");
    en.insert("status-validating", "Checking input...");
    en.insert("status-uploading", "Uploading...");
    en.insert("status-converting", "Converting...");
    en.insert("status-complete", "Conversion complete");
    en.insert("status-failed", "Conversion failed");
    en.insert("artifact-title", "Your file is ready");
    en.insert("artifact-size", "Size:");
    en.insert("artifact-bitrate", "Bitrate:");
    en.insert("download-button", "Download");
    en.insert("downloading-button", "Saving...");
    en.insert("saved-to", "Saved to:");
    en.insert("error-title", "Error:");
    en.insert(
        "error-block-hint",
        "YouTube blocked the server from fetching this video. Try uploading the file directly instead.",
    );
    en.insert("history-title", "Recent conversions");
    en.insert("history-name", "File");
    en.insert("history-from", "From");
    en.insert("history-to", "To");
    en.insert("history-size", "Size");
    en.insert("error-empty-input", EMPTY_INPUT);
    en.insert("error-invalid-url", INVALID_URL);
    en.insert("error-conversion-failed", CONVERSION_FAILED);
    en.insert("error-unreachable", UNREACHABLE_BACKEND);
    en.insert("error-malformed", MALFORMED_RESPONSE);
    en.insert("error-unknown", UNKNOWN_FAILURE);
    en.insert("error-server-misconfigured", SERVER_MISCONFIGURED);
    en.insert("error-url-not-processed", URL_NOT_PROCESSED);
    en.insert("error-no-download-url", NO_DOWNLOAD_URL);
    en.insert("error-download-failed", DOWNLOAD_FAILED);
    en.insert("error-download-link", "This download link is not valid:");
    en.insert("error-save-failed", "Could not save the file:");
    en
}

fn spanish() -> Translations {
    let mut es = Translations::new();
    es.insert("app-title", "AudioConvert");
    es.insert("app-subtitle", "Convierta archivos o enlaces de audio y video al formato que necesita.");
    es.insert("drop-title", "Arrastre y suelte un archivo aquí");
    es.insert("drop-hover", "Suelte para seleccionar este archivo");
    es.insert("browse-file", "Buscar archivos...");
    es.insert("selected-file", "Archivo seleccionado:");
    es.insert("clear-file", "Quitar");
    es.insert("url-label", "O pegue una URL de YouTube, SoundCloud o Spotify:");
    es.insert("url-placeholder", "https://www.youtube.com/watch?v=...");
    es.insert("format-label", "Convertir a:");
    es.insert("format-mp3", "MP3 - Tamaño compacto, buena calidad");
    es.insert("format-wav", "WAV - Formato de audio sin pérdida");
    es.insert("format-aac", "AAC - Codificación de audio avanzada");
    es.insert("format-flac", "FLAC - Códec de audio libre sin pérdida");
    es.insert("download-to", "Guardar descargas en:");
    es.insert("browse-button", "Buscar...");
    es.insert("convert-button", "Convertir");
    es.insert("converting-button", "Convirtiendo...");
    es.insert("status-ready", "Listo");
    es.insert("status-validating", "Comprobando la entrada...");
    es.insert("status-uploading", "Subiendo...");
    es.insert("status-converting", "Convirtiendo...");
    es.insert("status-complete", "Conversión completada");
    es.insert("status-failed", "La conversión falló");
    es.insert("artifact-title", "Su archivo está listo");
    es.insert("artifact-size", "Tamaño:");
    es.insert("artifact-bitrate", "Tasa de bits:");
    es.insert("download-button", "Descargar");
    es.insert("downloading-button", "Guardando...");
    es.insert("saved-to", "Guardado en:");
    es.insert("error-title", "Error:");
    es.insert(
        "error-block-hint",
        "YouTube bloqueó al servidor al obtener este video. Intente subir el archivo directamente.",
    );
    es.insert("history-title", "Conversiones recientes");
    es.insert("history-name", "Archivo");
    es.insert("history-from", "Origen");
    es.insert("history-to", "Destino");
    es.insert("history-size", "Tamaño");
    es.insert("error-empty-input", "Suba un archivo o introduzca una URL");
    es.insert("error-invalid-url", "Introduzca una URL válida de YouTube, SoundCloud o Spotify");
    es.insert("error-conversion-failed", "La conversión falló");
    es.insert(
        "error-unreachable",
        "No se pudo conectar con el servidor de conversión. Inténtelo de nuevo.",
    );
    es.insert("error-malformed", "El servidor de conversión devolvió una respuesta inesperada.");
    es.insert("error-unknown", "Se produjo un error desconocido durante la conversión");
    es.insert(
        "error-server-misconfigured",
        "Problema de configuración del servidor: FFmpeg no está instalado. Contacte con soporte.",
    );
    es.insert(
        "error-url-not-processed",
        "No se pudo procesar esta URL. Intente subir el archivo directamente o use otra URL.",
    );
    es.insert("error-no-download-url", "No hay URL disponible para el archivo convertido.");
    es.insert("error-download-failed", "Error al descargar el archivo. Inténtelo de nuevo.");
    es.insert("error-download-link", "Este enlace de descarga no es válido:");
    es.insert("error-save-failed", "No se pudo guardar el archivo:");
    es
}

impl Localizations {
    pub fn new() -> Self {
        let mut translations = HashMap::new();
        translations.insert("en-US", english());
        translations.insert("es-ES", spanish());

        let mut localizer = Self {
            translations,
            current_lang: FALLBACK_LANGUAGE.to_string(),
        };

        let requested = DesktopLanguageRequester::requested_languages();
        localizer.select(&requested);
        localizer
    }

    /// Picks the first requested language we have strings for.
    pub fn select(&mut self, requested: &[LanguageIdentifier]) {
        let supported: [(LanguageIdentifier, &str); 2] =
            [(langid!("en-US"), "en-US"), (langid!("es-ES"), "es-ES")];

        let chosen = requested.iter().find_map(|wanted| {
            supported
                .iter()
                .find(|(available, _)| available.language == wanted.language)
                .map(|(_, key)| *key)
        });

        self.current_lang = chosen.unwrap_or(FALLBACK_LANGUAGE).to_string();
        log::debug!("UI language: {}", self.current_lang);
    }

    pub fn current_language(&self) -> &str {
        &self.current_lang
    }

    pub fn lookup_single_language(&self, key: &str) -> Option<String> {
        self.translations
            .get(self.current_lang.as_str())
            .and_then(|t| t.lookup(key))
            .or_else(|| {
                self.translations
                    .get(FALLBACK_LANGUAGE)
                    .and_then(|t| t.lookup(key))
            })
            .map(|s| s.to_string())
    }

    /// Like [`Self::lookup_single_language`], showing the key itself when nothing matches.
    pub fn text(&self, key: &str) -> String {
        self.lookup_single_language(key)
            .unwrap_or_else(|| key.to_string())
    }

    /// Translates a fixed library message. Text relayed from the backend is
    /// shown as received.
    pub fn message(&self, message: &str) -> String {
        MESSAGE_KEYS
            .iter()
            .find(|(known, _)| *known == message)
            .map(|(_, key)| self.text(key))
            .unwrap_or_else(|| message.to_string())
    }

    pub fn download_error(&self, err: &DownloadError) -> String {
        match err {
            DownloadError::NoArtifact => self.text("error-no-download-url"),
            DownloadError::InvalidUrl(link) => {
                format!("{} {link:?}", self.text("error-download-link"))
            }
            DownloadError::Transport(_) => self.text("error-download-failed"),
            DownloadError::Io(detail) => format!("{} {detail}", self.text("error-save-failed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_english_key_is_translated() {
        let (en, es) = (english(), spanish());
        for key in en.keys() {
            assert!(es.lookup(key).is_some(), "missing Spanish string for {key}");
        }
    }

    #[test]
    fn test_select_matches_on_language_only() {
        let mut localizer = Localizations::new();

        localizer.select(&[langid!("es-MX")]);
        assert_eq!(localizer.current_language(), "es-ES");
        assert_eq!(localizer.text("convert-button"), "Convertir");

        localizer.select(&[langid!("fr-FR"), langid!("en-GB")]);
        assert_eq!(localizer.current_language(), "en-US");

        localizer.select(&[langid!("de-DE")]);
        assert_eq!(localizer.current_language(), FALLBACK_LANGUAGE);
    }

    #[test]
    fn test_library_messages_follow_ui_language() {
        let mut localizer = Localizations::new();
        let (en, es) = (english(), spanish());
        for (message, key) in MESSAGE_KEYS {
            assert_eq!(en.lookup(key), Some(message), "{key}");
            assert!(es.lookup(key).is_some_and(|text| text != message), "{key}");
        }

        localizer.select(&[langid!("es-ES")]);
        assert_eq!(localizer.message(EMPTY_INPUT), "Suba un archivo o introduzca una URL");
        assert_eq!(
            localizer.message(UNREACHABLE_BACKEND),
            "No se pudo conectar con el servidor de conversión. Inténtelo de nuevo."
        );
        assert_eq!(localizer.message("Unsupported codec"), "Unsupported codec");
        assert_eq!(
            localizer.download_error(&DownloadError::Transport("timed out".into())),
            "Error al descargar el archivo. Inténtelo de nuevo."
        );
        assert_eq!(
            localizer.download_error(&DownloadError::Io("disk full".into())),
            "No se pudo guardar el archivo: disk full"
        );

        localizer.select(&[langid!("en-US")]);
        assert_eq!(localizer.message(EMPTY_INPUT), EMPTY_INPUT);
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let localizer = Localizations::new();
        assert_eq!(localizer.text("no-such-key"), "no-such-key");
    }
}
