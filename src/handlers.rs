// src/handlers.rs
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures_util::TryStreamExt;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::errors::StudioError;
use crate::models::{ArtDirection, Environment, InlineImage, LensGeometry, LightProfile, Optics};
use crate::{AppState, models::VisualStyle};

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct OptionBody<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
pub struct EditModeBody {
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DataUrlBody {
    pub data_url: String,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/state", web::get().to(get_state))
            .route("/options", web::get().to(list_options))
            .route("/styles", web::get().to(list_styles))
            .route("/styles/{style_id}/apply", web::post().to(apply_style))
            .route("/prompt", web::put().to(set_prompt))
            .route("/config", web::put().to(set_config))
            .route("/config/lens", web::put().to(set_lens))
            .route("/config/light", web::put().to(set_light))
            .route("/config/environment", web::put().to(set_environment))
            .route("/config/optics", web::put().to(set_optics))
            .route("/reference", web::post().to(upload_reference))
            .route("/reference", web::put().to(set_reference_data_url))
            .route("/reference", web::delete().to(clear_reference))
            .route("/generate", web::post().to(generate))
            .route("/edit/prompt", web::put().to(set_edit_prompt))
            .route("/edit/mode", web::put().to(set_edit_mode))
            .route("/edit", web::post().to(edit))
            .route("/history", web::get().to(list_history))
            .route("/history/{image_id}/select", web::post().to(select_history))
            .route("/images/{image_id}/download", web::get().to(download_image)),
    );
}

async fn state_response(data: &AppState) -> HttpResponse {
    let snapshot = data.studio.with_session(|s| s.snapshot()).await;
    HttpResponse::Ok().json(snapshot)
}

pub async fn get_state(data: web::Data<AppState>) -> HttpResponse {
    state_response(&data).await
}

fn options<T: Serialize + Copy>(all: &[T], label: fn(T) -> &'static str) -> Vec<serde_json::Value> {
    all.iter()
        .map(|value| serde_json::json!({ "value": value, "label": label(*value) }))
        .collect()
}

/// Selectable values per dimension with their display labels.
pub async fn list_options() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "lens": options(&LensGeometry::ALL, LensGeometry::label),
        "light": options(&LightProfile::ALL, LightProfile::label),
        "environment": options(&Environment::ALL, Environment::label),
        "optics": options(&Optics::ALL, Optics::label),
        "default": ArtDirection::default(),
    }))
}

pub async fn list_styles() -> HttpResponse {
    let styles: &[VisualStyle] = catalog::all();
    HttpResponse::Ok().json(styles)
}

pub async fn apply_style(
    path: web::Path<String>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let style_id = path.into_inner();
    let style = catalog::find_by_id(&style_id)
        .ok_or_else(|| StudioError::NotFound(format!("style {}", style_id)))?;

    data.studio.with_session(|s| s.apply_style(style)).await;
    Ok(state_response(&data).await)
}

pub async fn set_prompt(body: web::Json<TextBody>, data: web::Data<AppState>) -> HttpResponse {
    let text = body.into_inner().text;
    data.studio.with_session(|s| s.set_prompt(text)).await;
    state_response(&data).await
}

pub async fn set_config(body: web::Json<ArtDirection>, data: web::Data<AppState>) -> HttpResponse {
    let config = body.into_inner();
    data.studio.with_session(|s| s.set_config(config)).await;
    state_response(&data).await
}

pub async fn set_lens(
    body: web::Json<OptionBody<LensGeometry>>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let lens = body.into_inner().value;
    data.studio.with_session(|s| s.set_lens(lens)).await;
    state_response(&data).await
}

pub async fn set_light(
    body: web::Json<OptionBody<LightProfile>>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let light = body.into_inner().value;
    data.studio.with_session(|s| s.set_light(light)).await;
    state_response(&data).await
}

pub async fn set_environment(
    body: web::Json<OptionBody<Environment>>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let environment = body.into_inner().value;
    data.studio
        .with_session(|s| s.set_environment(environment))
        .await;
    state_response(&data).await
}

pub async fn set_optics(
    body: web::Json<OptionBody<Optics>>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let optics = body.into_inner().value;
    data.studio.with_session(|s| s.set_optics(optics)).await;
    state_response(&data).await
}

pub async fn upload_reference(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let mut field = payload
        .try_next()
        .await?
        .ok_or_else(|| StudioError::ImageProcessing("No file provided".to_string()))?;

    let mut image_data = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        image_data.extend_from_slice(&chunk);
    }

    let reference = data.image_processor.prepare_reference(&image_data)?;
    info!(
        "Reference image set ({}, {} bytes)",
        reference.mime_type,
        reference.data.len()
    );
    data.studio
        .with_session(|s| s.set_reference_image(reference))
        .await;
    Ok(state_response(&data).await)
}

/// An empty data URL, or one with an empty payload, clears the reference.
pub async fn set_reference_data_url(
    body: web::Json<DataUrlBody>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let data_url = body.into_inner().data_url;
    if data_url.trim().is_empty() {
        data.studio.with_session(|s| s.clear_reference_image()).await;
        return Ok(state_response(&data).await);
    }

    let decoded = InlineImage::from_data_url(&data_url)?;
    if decoded.data.is_empty() {
        data.studio.with_session(|s| s.clear_reference_image()).await;
        return Ok(state_response(&data).await);
    }

    let reference = data.image_processor.prepare_reference(&decoded.data)?;
    data.studio
        .with_session(|s| s.set_reference_image(reference))
        .await;
    Ok(state_response(&data).await)
}

pub async fn clear_reference(data: web::Data<AppState>) -> HttpResponse {
    data.studio.with_session(|s| s.clear_reference_image()).await;
    state_response(&data).await
}

pub async fn generate(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let image = data.studio.generate().await?;
    Ok(HttpResponse::Ok().json(&image))
}

pub async fn set_edit_prompt(
    body: web::Json<TextBody>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let text = body.into_inner().text;
    data.studio.with_session(|s| s.set_edit_prompt(text)).await;
    state_response(&data).await
}

/// `{"enabled": bool}` sets edit mode; an omitted flag toggles it.
pub async fn set_edit_mode(
    body: web::Json<EditModeBody>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let enabled = body.into_inner().enabled;
    data.studio
        .with_session(|s| match enabled {
            Some(enabled) => s.set_editing(enabled),
            None => {
                s.toggle_editing();
            }
        })
        .await;
    state_response(&data).await
}

pub async fn edit(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let image = data.studio.edit().await?;
    Ok(HttpResponse::Ok().json(&image))
}

pub async fn list_history(data: web::Data<AppState>) -> HttpResponse {
    let history = data.studio.with_session(|s| s.history().clone()).await;
    HttpResponse::Ok().json(history)
}

pub async fn select_history(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let image_id = path.into_inner();
    let image = data
        .studio
        .with_session(|s| s.select_from_history(&image_id).cloned())
        .await?;
    Ok(HttpResponse::Ok().json(&image))
}

pub async fn download_image(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let image_id = path.into_inner();
    let image = data
        .studio
        .with_session(|s| s.find_image(&image_id).cloned())
        .await
        .ok_or_else(|| StudioError::NotFound(format!("image {}", image_id)))?;

    Ok(HttpResponse::Ok()
        .content_type(image.url.mime_type.as_str())
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", image.download_filename()),
        ))
        .body(image.url.data))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    use super::*;
    use crate::services::ImageProcessor;
    use crate::studio::Studio;
    use crate::studio::testing::{ScriptedGenerator, png};

    fn app_state(generator: ScriptedGenerator) -> (AppState, Arc<ScriptedGenerator>) {
        let generator = Arc::new(generator);
        let state = AppState {
            studio: Arc::new(Studio::new(generator.clone())),
            image_processor: Arc::new(ImageProcessor::default()),
        };
        (state, generator)
    }

    macro_rules! service {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(routes),
            )
            .await
        };
    }

    fn tiny_png() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 2));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[actix_web::test]
    async fn apply_style_reports_matching_preset() {
        let (state, _) = app_state(ScriptedGenerator::default());
        let app = service!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/styles/cyberpunk/apply")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body["config"],
            json!({ "lens": "angular", "light": "night", "environment": "exterior", "optics": "bokeh" })
        );
        assert_eq!(body["matching_style_id"], "cyberpunk");
    }

    #[actix_web::test]
    async fn unknown_style_is_not_found() {
        let (state, _) = app_state(ScriptedGenerator::default());
        let app = service!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/styles/vaporwave/apply")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn generate_then_download() {
        let (state, _) = app_state(ScriptedGenerator::new([Some(png(3))]));
        let app = service!(state);

        let req = test::TestRequest::put()
            .uri("/api/v1/prompt")
            .set_json(json!({ "text": "a paper boat" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["can_generate"], true);

        let req = test::TestRequest::post().uri("/api/v1/generate").to_request();
        let image: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(image["prompt"], "a paper boat");
        assert_eq!(image["url"], png(3).to_data_url());
        let id = image["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/images/{}/download", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Content-Disposition").unwrap(),
            &format!("attachment; filename=\"aura-{}.png\"", id)
        );
        let bytes = test::read_body(resp).await;
        assert_eq!(&bytes[..], png(3).data.as_slice());
    }

    #[actix_web::test]
    async fn empty_prompt_is_rejected_without_remote_call() {
        let (state, generator) = app_state(ScriptedGenerator::default());
        let app = service!(state);

        let req = test::TestRequest::post().uri("/api/v1/generate").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(generator.calls().is_empty());
    }

    #[actix_web::test]
    async fn remote_failure_surfaces_generic_notice() {
        let (state, _) = app_state(ScriptedGenerator::new([None]));
        let app = service!(state);

        let req = test::TestRequest::put()
            .uri("/api/v1/prompt")
            .set_json(json!({ "text": "a paper boat" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post().uri("/api/v1/generate").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Error generating image.");

        let req = test::TestRequest::get().uri("/api/v1/state").to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["is_loading"], false);
        assert_eq!(state["history"], json!([]));
        assert_eq!(state["current_image"], Value::Null);
    }

    #[actix_web::test]
    async fn edit_flow_through_http() {
        let (state, _) = app_state(ScriptedGenerator::new([Some(png(1)), Some(png(2))]));
        let app = service!(state);

        let req = test::TestRequest::put()
            .uri("/api/v1/prompt")
            .set_json(json!({ "text": "city" }))
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post().uri("/api/v1/generate").to_request();
        let parent: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/v1/edit/mode")
            .set_json(json!({}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["is_editing"], true);

        let req = test::TestRequest::put()
            .uri("/api/v1/edit/prompt")
            .set_json(json!({ "text": "add rain" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post().uri("/api/v1/edit").to_request();
        let edited: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(edited["prompt"], "Edit: add rain");
        assert_eq!(edited["config"], parent["config"]);

        let req = test::TestRequest::get().uri("/api/v1/state").to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["is_editing"], false);
        assert_eq!(state["edit_prompt"], "");
        assert_eq!(state["history"].as_array().unwrap().len(), 2);

        let parent_id = parent["id"].as_str().unwrap();
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/history/{}/select", parent_id))
            .to_request();
        let selected: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(selected["id"], parent["id"]);
    }

    #[actix_web::test]
    async fn single_option_updates_config() {
        let (state, _) = app_state(ScriptedGenerator::default());
        let app = service!(state);

        let req = test::TestRequest::put()
            .uri("/api/v1/config/light")
            .set_json(json!({ "value": "golden" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["config"]["light"], "golden");
        assert_eq!(body["config"]["lens"], "medio");
        assert_eq!(body["matching_style_id"], "analog");

        let req = test::TestRequest::put()
            .uri("/api/v1/config/lens")
            .set_json(json!({ "value": "fisheye" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn reference_data_url_set_and_cleared() {
        let (state, _) = app_state(ScriptedGenerator::default());
        let app = service!(state);

        let reference = InlineImage::new("image/png", tiny_png());
        let req = test::TestRequest::put()
            .uri("/api/v1/reference")
            .set_json(json!({ "data_url": reference.to_data_url() }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["reference_image"], reference.to_data_url());

        let req = test::TestRequest::put()
            .uri("/api/v1/reference")
            .set_json(json!({ "data_url": "" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["reference_image"], Value::Null);
    }

    #[actix_web::test]
    async fn header_only_data_url_clears_reference() {
        let (state, _) = app_state(ScriptedGenerator::default());
        let app = service!(state);

        let reference = InlineImage::new("image/png", tiny_png());
        let req = test::TestRequest::put()
            .uri("/api/v1/reference")
            .set_json(json!({ "data_url": reference.to_data_url() }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/v1/reference")
            .set_json(json!({ "data_url": "data:image/png;base64," }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["reference_image"], Value::Null);
    }

    #[actix_web::test]
    async fn invalid_reference_is_bad_request() {
        let (state, _) = app_state(ScriptedGenerator::default());
        let app = service!(state);

        let req = test::TestRequest::put()
            .uri("/api/v1/reference")
            .set_json(json!({ "data_url": "data:image/png;base64,AQID" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn options_carry_labels() {
        let (state, _) = app_state(ScriptedGenerator::default());
        let app = service!(state);

        let req = test::TestRequest::get().uri("/api/v1/options").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["lens"].as_array().unwrap().len(), 3);
        assert_eq!(body["light"][2], json!({ "value": "golden", "label": "Golden Hour" }));
        assert_eq!(body["optics"][1]["label"], "Source Asset");
        assert_eq!(body["default"]["lens"], "medio");
    }

    #[actix_web::test]
    async fn styles_are_listed_in_catalog_order() {
        let (state, _) = app_state(ScriptedGenerator::default());
        let app = service!(state);

        let req = test::TestRequest::get().uri("/api/v1/styles").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids.len(), 12);
        assert_eq!(ids[0], "cyberpunk");
        assert_eq!(ids[11], "synthwave");
    }
}
