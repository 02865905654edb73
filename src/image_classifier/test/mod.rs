mod inference_test;
